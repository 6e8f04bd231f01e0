//! Handlers for `/machines` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/machines` | All machines, newest first |
//! | `POST`   | `/machines` | Body: [`NewMachineBody`]; requires ≥ 1 item; 201 + [`MachineDetail`] |
//! | `GET`    | `/machines/:id` | Machine with its items |
//! | `PUT`    | `/machines/:id` | Body: [`MachineUpdateBody`]; partial update |
//! | `DELETE` | `/machines/:id` | Cascades items, notifications, work orders |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wrench_core::{
  item::{MaintenanceItem, NewMaintenanceItem},
  machine::{Machine, MachineUpdate, NewMachine},
  store::MaintenanceStore,
};
use wrench_engine::Mailer;

use crate::{
  ApiState,
  error::ApiError,
  items::{NewItemBody, validate_item_body},
};

/// A machine together with its maintenance items.
#[derive(Debug, Serialize)]
pub struct MachineDetail {
  pub machine: Machine,
  pub items:   Vec<MaintenanceItem>,
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /machines`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
) -> Result<Json<Vec<Machine>>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  let machines = state.store.list_machines().await.map_err(ApiError::store)?;
  Ok(Json(machines))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /machines/:id`
pub async fn get_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MachineDetail>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  let machine = state
    .store
    .get_machine(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("machine {id} not found")))?;
  let items = state.store.list_items(id).await.map_err(ApiError::store)?;
  Ok(Json(MachineDetail { machine, items }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /machines`.
#[derive(Debug, Deserialize)]
pub struct NewMachineBody {
  pub name:            String,
  pub serial_number:   String,
  #[serde(default)]
  pub catalog_link:    Option<String>,
  #[serde(default)]
  pub operating_hours: u32,
  pub notice_hours:    u32,
  pub items:           Vec<NewItemBody>,
}

/// `POST /machines` — returns 201 + the stored machine with its items.
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  Json(body): Json<NewMachineBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("machine name is required".into()));
  }
  if body.serial_number.trim().is_empty() {
    return Err(ApiError::BadRequest("serial number is required".into()));
  }
  if body.notice_hours == 0 {
    return Err(ApiError::BadRequest(
      "notification lead time must be positive".into(),
    ));
  }
  if body.items.is_empty() {
    return Err(ApiError::BadRequest(
      "at least one maintenance item is required".into(),
    ));
  }
  for item in &body.items {
    validate_item_body(item)?;
  }

  if state
    .store
    .machine_by_serial(&body.serial_number)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!(
      "a machine with serial number {:?} already exists",
      body.serial_number
    )));
  }

  let machine = state
    .store
    .add_machine(NewMachine {
      name:            body.name,
      serial_number:   body.serial_number,
      catalog_link:    body.catalog_link,
      operating_hours: body.operating_hours,
      notice_hours:    body.notice_hours,
    })
    .await
    .map_err(ApiError::store)?;

  let mut items = Vec::with_capacity(body.items.len());
  for item in body.items {
    let stored = state
      .store
      .add_item(NewMaintenanceItem {
        machine_id:       machine.machine_id,
        name:             item.name,
        category:         item.category,
        interval_hours:   item.interval_hours,
        last_replaced_at: item.last_replaced_at,
      })
      .await
      .map_err(ApiError::store)?;
    items.push(stored);
  }

  Ok((StatusCode::CREATED, Json(MachineDetail { machine, items })))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /machines/:id`; absent fields are unchanged.
#[derive(Debug, Deserialize)]
pub struct MachineUpdateBody {
  pub name:            Option<String>,
  pub serial_number:   Option<String>,
  pub operating_hours: Option<u32>,
  pub notice_hours:    Option<u32>,
}

/// `PUT /machines/:id`
pub async fn update_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<MachineUpdateBody>,
) -> Result<Json<Machine>, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("machine name is required".into()));
  }
  if body
    .serial_number
    .as_deref()
    .is_some_and(|s| s.trim().is_empty())
  {
    return Err(ApiError::BadRequest("serial number is required".into()));
  }
  if body.notice_hours == Some(0) {
    return Err(ApiError::BadRequest(
      "notification lead time must be positive".into(),
    ));
  }

  if let Some(serial) = &body.serial_number {
    let holder = state
      .store
      .machine_by_serial(serial)
      .await
      .map_err(ApiError::store)?;
    if holder.is_some_and(|m| m.machine_id != id) {
      return Err(ApiError::Conflict(format!(
        "a machine with serial number {serial:?} already exists"
      )));
    }
  }

  let machine = state
    .store
    .update_machine(id, MachineUpdate {
      name:            body.name,
      serial_number:   body.serial_number,
      operating_hours: body.operating_hours,
      notice_hours:    body.notice_hours,
    })
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("machine {id} not found")))?;

  Ok(Json(machine))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /machines/:id`
pub async fn delete_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MaintenanceStore,
  M: Mailer,
{
  let deleted = state
    .store
    .delete_machine(id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(format!("machine {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
