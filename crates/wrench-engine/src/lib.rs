//! The notification engine: per-machine orchestration and the batch sweep.
//!
//! [`NotificationEngine`] ties the pure evaluation/reconciliation functions
//! from `wrench-core` to a [`MaintenanceStore`](wrench_core::store) backend
//! and a [`Mailer`] delivery collaborator. It owns no timer state: the
//! periodic cadence lives entirely in whatever calls
//! [`NotificationEngine::run_sweep`].

#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod mailer;


pub use engine::{
  CreatedNotice, MachineSweepDetail, NotificationEngine, SweepSummary,
};
pub use error::{Error, Result};
pub use mailer::{LogMailer, Mailer};
