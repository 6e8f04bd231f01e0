//! Handlers for maintenance-item endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/machines/:id/items` | A machine's items, newest first |
//! | `POST`   | `/machines/:id/items` | Body: [`NewItemBody`]; 201 + stored item |
//! | `PUT`    | `/items/:id` | Partial update; schedule edits re-evaluate the machine |
//! | `DELETE` | `/items/:id` | Cascades the item's notifications |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use wrench_core::{
  item::{MaintenanceItem, MaintenanceItemUpdate, NewMaintenanceItem},
  notify::ServiceCategory,
  store::MaintenanceStore,
};
use wrench_engine::Mailer;

use crate::{ApiState, error::ApiError};

// ─── Validation ──────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /machines/:id/items` (and nested in machine
/// creation).
#[derive(Debug, Deserialize)]
pub struct NewItemBody {
  pub name:             String,
  pub category:         ServiceCategory,
  pub interval_hours:   u32,
  pub last_replaced_at: DateTime<Utc>,
}

pub(crate) fn validate_item_body(body: &NewItemBody) -> Result<(), ApiError> {
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("item name is required".into()));
  }
  if body.interval_hours == 0 {
    return Err(ApiError::BadRequest(
      "replacement interval must be positive".into(),
    ));
  }
  validate_replacement_date(body.last_replaced_at)
}

pub(crate) fn validate_replacement_date(
  date: DateTime<Utc>,
) -> Result<(), ApiError> {
  if date > Utc::now() {
    return Err(ApiError::BadRequest(
      "last replacement date cannot be in the future".into(),
    ));
  }
  Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /machines/:id/items`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(machine_id): Path<Uuid>,
) -> Result<Json<Vec<MaintenanceItem>>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  ensure_machine(&state, machine_id).await?;
  let items = state
    .store
    .list_items(machine_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /machines/:id/items` — returns 201 + the stored item.
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(machine_id): Path<Uuid>,
  Json(body): Json<NewItemBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  validate_item_body(&body)?;
  ensure_machine(&state, machine_id).await?;

  let item = state
    .store
    .add_item(NewMaintenanceItem {
      machine_id,
      name: body.name,
      category: body.category,
      interval_hours: body.interval_hours,
      last_replaced_at: body.last_replaced_at,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /items/:id`; absent fields are unchanged.
#[derive(Debug, Deserialize)]
pub struct ItemUpdateBody {
  pub name:             Option<String>,
  pub category:         Option<ServiceCategory>,
  pub interval_hours:   Option<u32>,
  pub last_replaced_at: Option<DateTime<Utc>>,
}

/// `PUT /items/:id`
///
/// Editing `interval_hours` or `last_replaced_at` changes the item's due
/// status, so the machine is re-evaluated before the response is returned —
/// an obsolete notification retires (or a fresh one fires) immediately
/// rather than on the next sweep.
pub async fn update_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ItemUpdateBody>,
) -> Result<Json<MaintenanceItem>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("item name is required".into()));
  }
  if body.interval_hours == Some(0) {
    return Err(ApiError::BadRequest(
      "replacement interval must be positive".into(),
    ));
  }
  if let Some(date) = body.last_replaced_at {
    validate_replacement_date(date)?;
  }

  let update = MaintenanceItemUpdate {
    name:             body.name,
    category:         body.category,
    interval_hours:   body.interval_hours,
    last_replaced_at: body.last_replaced_at,
  };
  let reevaluate = update.changes_schedule();

  let item = state
    .store
    .update_item(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;

  if reevaluate {
    if let Err(err) = state.engine.evaluate_machine(item.machine_id).await {
      tracing::warn!(
        machine_id = %item.machine_id,
        error = %err,
        "re-evaluation after item edit failed"
      );
    }
  }

  Ok(Json(item))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /items/:id`
pub async fn delete_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  let deleted = state.store.delete_item(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(format!("item {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn ensure_machine<S, M>(
  state: &ApiState<S, M>,
  machine_id: Uuid,
) -> Result<(), ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  state
    .store
    .get_machine(machine_id)
    .await
    .map_err(ApiError::store)?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound(format!("machine {machine_id} not found")))
}
