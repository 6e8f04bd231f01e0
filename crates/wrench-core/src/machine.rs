//! Machine — the owning aggregate for maintenance items.
//!
//! A machine holds the notification lead time shared by all of its items.
//! Notifications and work orders belong to it transitively, through the
//! items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
  pub machine_id:      Uuid,
  pub name:            String,
  /// Manufacturer serial number; unique across the store.
  pub serial_number:   String,
  /// Link to the manufacturer's parts catalogue, if any.
  pub catalog_link:    Option<String>,
  /// Cumulative operating-hours counter reported by the operator.
  ///
  /// Recorded and exposed over the API, but not consulted by the due-date
  /// evaluator, which runs on wall-clock time since last replacement.
  pub operating_hours: u32,
  /// Lead time in hours: how far before an item falls due its first
  /// notification fires.
  pub notice_hours:    u32,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::MaintenanceStore::add_machine`].
/// `machine_id` and `created_at` are always set by the store; they are not
/// accepted from callers.
#[derive(Debug, Clone)]
pub struct NewMachine {
  pub name:            String,
  pub serial_number:   String,
  pub catalog_link:    Option<String>,
  pub operating_hours: u32,
  pub notice_hours:    u32,
}

/// Partial update for a machine; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MachineUpdate {
  pub name:            Option<String>,
  pub serial_number:   Option<String>,
  pub operating_hours: Option<u32>,
  pub notice_hours:    Option<u32>,
}
