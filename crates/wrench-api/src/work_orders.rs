//! Handlers for work-order endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/machines/:id/work-orders` | History, newest first |
//! | `POST` | `/work-orders/:id/complete` | Body: [`CompleteWorkBody`]; 404 unless in progress |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use wrench_core::{store::MaintenanceStore, work::WorkOrder};
use wrench_engine::Mailer;

use crate::{
  ApiState, error::ApiError, items::validate_replacement_date,
};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /machines/:id/work-orders`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(machine_id): Path<Uuid>,
) -> Result<Json<Vec<WorkOrder>>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  state
    .store
    .get_machine(machine_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("machine {machine_id} not found"))
    })?;

  let orders = state
    .store
    .list_work_orders(machine_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(orders))
}

// ─── Complete ────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /work-orders/:id/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteWorkBody {
  /// When the replacement was actually performed; becomes the item's new
  /// `last_replaced_at`.
  pub last_replaced_at: DateTime<Utc>,
  #[serde(default)]
  pub comment:          Option<String>,
}

/// `POST /work-orders/:id/complete`
///
/// Resets the item, deletes the linked notification, and re-evaluates the
/// machine so its notification state restarts from a clean slate.
pub async fn complete<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CompleteWorkBody>,
) -> Result<Json<WorkOrder>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  validate_replacement_date(body.last_replaced_at)?;

  let work_order = state
    .store
    .complete_work(id, body.last_replaced_at, body.comment)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "work order {id} not found or already completed"
      ))
    })?;

  if let Err(err) = state.engine.evaluate_machine(work_order.machine_id).await
  {
    tracing::warn!(
      machine_id = %work_order.machine_id,
      error = %err,
      "re-evaluation after work completion failed"
    );
  }

  Ok(Json(work_order))
}
