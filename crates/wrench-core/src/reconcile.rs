//! Lifecycle reconciliation.
//!
//! [`reconcile`] compares a fresh [`DueEvaluation`] against the currently
//! active notification for the same item and names the single write, if any,
//! that brings stored state in line. Applying the write is the caller's job;
//! keeping the decision pure makes the whole transition table testable
//! without a database.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  notify::{Notification, Urgency},
  schedule::DueEvaluation,
};

/// The write needed to bring an item's notification state in line with its
/// latest evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LifecycleAction {
  /// No active notification exists and one is warranted.
  Create { urgency: Urgency },
  /// The active notification is `Approaching` but the item is now overdue.
  /// Urgency is raised in place; identity and `triggered_at` survive.
  Escalate { notification_id: Uuid },
  /// The due condition no longer holds; the active notification moves to
  /// `Retired`.
  Retire { notification_id: Uuid },
  /// Stored state already matches; nothing to write, nothing to deliver.
  Keep,
}

/// Decide the lifecycle action for one item.
///
/// `active` must be the item's current `Active` notification, if any.
/// Idempotent: applying the returned action and reconciling again yields
/// [`LifecycleAction::Keep`]. Urgency never moves downward — an active
/// `Required` notification stays `Required` even if a stale evaluation says
/// `Approaching`.
pub fn reconcile(
  evaluation: Option<&DueEvaluation>,
  active:     Option<&Notification>,
) -> LifecycleAction {
  match (evaluation, active) {
    (Some(eval), None) => LifecycleAction::Create { urgency: eval.urgency },
    (Some(eval), Some(n)) => {
      if eval.urgency == Urgency::Required && n.urgency == Urgency::Approaching
      {
        LifecycleAction::Escalate { notification_id: n.notification_id }
      } else {
        LifecycleAction::Keep
      }
    }
    (None, Some(n)) => {
      LifecycleAction::Retire { notification_id: n.notification_id }
    }
    (None, None) => LifecycleAction::Keep,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::notify::{NotificationStatus, ServiceCategory};

  fn eval(urgency: Urgency) -> DueEvaluation {
    let hours_until_due = match urgency {
      Urgency::Approaching => 20.0,
      Urgency::Required => -5.0,
    };
    DueEvaluation { urgency, hours_until_due }
  }

  fn active(urgency: Urgency) -> Notification {
    Notification {
      notification_id: Uuid::new_v4(),
      machine_id:      Uuid::new_v4(),
      item_id:         Uuid::new_v4(),
      category:        ServiceCategory::Part,
      urgency,
      status:          NotificationStatus::Active,
      triggered_at:    Utc::now(),
    }
  }

  #[test]
  fn no_state_and_approaching_creates() {
    let action = reconcile(Some(&eval(Urgency::Approaching)), None);
    assert_eq!(action, LifecycleAction::Create {
      urgency: Urgency::Approaching,
    });
  }

  #[test]
  fn no_state_and_required_creates() {
    let action = reconcile(Some(&eval(Urgency::Required)), None);
    assert_eq!(action, LifecycleAction::Create {
      urgency: Urgency::Required,
    });
  }

  #[test]
  fn approaching_to_required_escalates_in_place() {
    let existing = active(Urgency::Approaching);
    let action = reconcile(Some(&eval(Urgency::Required)), Some(&existing));
    assert_eq!(action, LifecycleAction::Escalate {
      notification_id: existing.notification_id,
    });
  }

  #[test]
  fn matching_urgency_keeps() {
    for urgency in [Urgency::Approaching, Urgency::Required] {
      let existing = active(urgency);
      let action = reconcile(Some(&eval(urgency)), Some(&existing));
      assert_eq!(action, LifecycleAction::Keep);
    }
  }

  #[test]
  fn downgrade_is_kept_not_applied() {
    // Cannot arise from the evaluator under monotonic time, but must be a
    // no-op if it ever does.
    let existing = active(Urgency::Required);
    let action = reconcile(Some(&eval(Urgency::Approaching)), Some(&existing));
    assert_eq!(action, LifecycleAction::Keep);
  }

  #[test]
  fn resolved_condition_retires_existing() {
    for urgency in [Urgency::Approaching, Urgency::Required] {
      let existing = active(urgency);
      let action = reconcile(None, Some(&existing));
      assert_eq!(action, LifecycleAction::Retire {
        notification_id: existing.notification_id,
      });
    }
  }

  #[test]
  fn nothing_due_and_no_state_keeps() {
    assert_eq!(reconcile(None, None), LifecycleAction::Keep);
  }
}
