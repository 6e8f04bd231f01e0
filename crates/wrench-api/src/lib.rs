//! JSON REST API for Wrench.
//!
//! Exposes an axum [`Router`] backed by any
//! [`wrench_core::store::MaintenanceStore`] plus a
//! [`wrench_engine::NotificationEngine`] for the re-evaluation hooks.
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", wrench_api::api_router(state))
//! ```

pub mod error;
pub mod items;
pub mod machines;
pub mod notifications;
pub mod work_orders;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use wrench_core::store::MaintenanceStore;
use wrench_engine::{Mailer, NotificationEngine};

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S, M> {
  pub store:  Arc<S>,
  pub engine: Arc<NotificationEngine<S, M>>,
}

// Manual impl: `S`/`M` themselves need not be `Clone`.
impl<S, M> Clone for ApiState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      engine: self.engine.clone(),
    }
  }
}

/// Build a fully-materialised API router for the given state.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: ApiState<S, M>) -> Router<()>
where
  S: MaintenanceStore + 'static,
  M: Mailer + 'static,
{
  Router::new()
    // Machines
    .route(
      "/machines",
      get(machines::list::<S, M>).post(machines::create::<S, M>),
    )
    .route(
      "/machines/{id}",
      get(machines::get_one::<S, M>)
        .put(machines::update_one::<S, M>)
        .delete(machines::delete_one::<S, M>),
    )
    // Maintenance items
    .route(
      "/machines/{id}/items",
      get(items::list::<S, M>).post(items::create::<S, M>),
    )
    .route(
      "/items/{id}",
      put(items::update_one::<S, M>).delete(items::delete_one::<S, M>),
    )
    // Notifications
    .route("/notifications", get(notifications::list::<S, M>))
    .route(
      "/notifications/{id}/start",
      post(notifications::start_work::<S, M>),
    )
    // Work orders
    .route("/machines/{id}/work-orders", get(work_orders::list::<S, M>))
    .route(
      "/work-orders/{id}/complete",
      post(work_orders::complete::<S, M>),
    )
    .with_state(state)
}
