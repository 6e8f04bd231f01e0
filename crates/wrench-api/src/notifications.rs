//! Handlers for `/notifications` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notifications` | Active alerts, `Required` first then newest |
//! | `POST` | `/notifications/:id/start` | Opens a work order; 404 unless the notification is `Active` |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;
use wrench_core::{
  notify::Notification, store::MaintenanceStore, work::WorkOrder,
};
use wrench_engine::Mailer;

use crate::{ApiState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /notifications`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  let notifications = state
    .store
    .list_active_notifications()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(notifications))
}

// ─── Start work ──────────────────────────────────────────────────────────────

/// Response of `POST /notifications/:id/start`.
#[derive(Debug, Serialize)]
pub struct StartWorkResponse {
  pub notification: Notification,
  pub work_order:   WorkOrder,
}

/// `POST /notifications/:id/start`
pub async fn start_work<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StartWorkResponse>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  let (notification, work_order) = state
    .store
    .start_work(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "notification {id} not found or already handled"
      ))
    })?;

  Ok(Json(StartWorkResponse { notification, work_order }))
}
