//! Core types and trait definitions for the Wrench maintenance tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//! The due-date evaluator and the lifecycle reconciler are pure functions
//! here so that every transition in the alert state machine is testable
//! without a clock or a database.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod item;
pub mod machine;
pub mod notify;
pub mod reconcile;
pub mod schedule;
pub mod store;
pub mod work;

pub use error::{Error, Result};
