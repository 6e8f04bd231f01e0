//! Maintenance items — the serviceable parts and fluids on a machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notify::ServiceCategory;

/// One serviceable component or fluid on a machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceItem {
  pub item_id:          Uuid,
  pub machine_id:       Uuid,
  pub name:             String,
  pub category:         ServiceCategory,
  /// Wall-clock hours between replacements.
  pub interval_hours:   u32,
  /// Reset when a work order completes; may also be edited directly, which
  /// triggers an immediate re-evaluation of the machine.
  pub last_replaced_at: DateTime<Utc>,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::MaintenanceStore::add_item`].
/// `item_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewMaintenanceItem {
  pub machine_id:       Uuid,
  pub name:             String,
  pub category:         ServiceCategory,
  pub interval_hours:   u32,
  pub last_replaced_at: DateTime<Utc>,
}

/// Partial update for an item; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceItemUpdate {
  pub name:             Option<String>,
  pub category:         Option<ServiceCategory>,
  pub interval_hours:   Option<u32>,
  pub last_replaced_at: Option<DateTime<Utc>>,
}

impl MaintenanceItemUpdate {
  /// Whether applying this update can change the item's due status.
  pub fn changes_schedule(&self) -> bool {
    self.interval_hours.is_some() || self.last_replaced_at.is_some()
  }
}
