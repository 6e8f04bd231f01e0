//! Work orders — the service history records opened from notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
  InProgress,
  Completed,
}

impl WorkOrderStatus {
  pub fn is_open(&self) -> bool { matches!(self, Self::InProgress) }
}

/// A service action, in progress or completed, for one maintenance item.
///
/// Opened from an `Active` notification. Completing it resets the item's
/// `last_replaced_at` and deletes the notification it was opened from, after
/// which the machine is re-evaluated from a clean slate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
  pub work_order_id:   Uuid,
  pub machine_id:      Uuid,
  pub item_id:         Uuid,
  /// The notification this order was opened from. Cleared when the order
  /// completes and the notification is deleted.
  pub notification_id: Option<Uuid>,
  pub status:          WorkOrderStatus,
  pub started_at:      DateTime<Utc>,
  pub completed_at:    Option<DateTime<Utc>>,
  pub comment:         Option<String>,
}
