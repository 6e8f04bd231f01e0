//! Notification types and their lifecycle states.
//!
//! A notification is the alert record for exactly one maintenance item. At
//! most one notification per item may be `Active` at any time; escalation
//! raises urgency in place, so a notification's identity and `triggered_at`
//! survive the `Approaching → Required` transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of serviceable an item (and its notifications) concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
  Part,
  Oil,
}

/// How urgent an alert is.
///
/// `Required` strictly implies `Approaching`'s condition, so a live
/// notification's urgency only ever moves upward.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
  /// Due within the machine's notification lead time.
  Approaching,
  /// At or past the replacement interval.
  Required,
}

/// Lifecycle status of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
  /// Live alert; counted against the one-per-item cap.
  Active,
  /// An operator opened a work order from this notification. The record is
  /// hard-deleted when that work order completes.
  WorkStarted,
  /// The due condition resolved without work (interval or replacement date
  /// was edited). Kept for audit; never resurrected.
  Retired,
}

impl NotificationStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

/// An alert for one maintenance item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub machine_id:      Uuid,
  pub item_id:         Uuid,
  /// Mirrors the item's category at creation time.
  pub category:        ServiceCategory,
  pub urgency:         Urgency,
  pub status:          NotificationStatus,
  /// Creation time; preserved across in-place escalation.
  pub triggered_at:    DateTime<Utc>,
}

/// Input to [`crate::store::MaintenanceStore::create_active_notification`].
/// The status is always `Active` and `triggered_at` is set by the store.
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub machine_id: Uuid,
  pub item_id:    Uuid,
  pub category:   ServiceCategory,
  pub urgency:    Urgency,
}
