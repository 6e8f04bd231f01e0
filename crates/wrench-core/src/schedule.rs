//! Pure due-date evaluation.
//!
//! [`evaluate_due`] turns "how long since this item was replaced" into an
//! urgency classification. `now` is a parameter and no I/O happens here, so
//! every boundary in the decision is testable with fixed timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, notify::Urgency};

/// Outcome of a due-date evaluation that warrants an alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DueEvaluation {
  pub urgency:         Urgency,
  /// Hours until the item is due; negative once overdue (the magnitude is
  /// how far past the interval the item has run).
  pub hours_until_due: f64,
}

/// Classify one maintenance item against the clock.
///
/// Returns `None` when no alert is warranted yet. `interval_hours` and
/// `notice_hours` must be positive; zero is rejected, never coerced.
///
/// A `last_replaced_at` in the future is treated as "replaced just now":
/// elapsed time clamps to zero. The write boundary rejects future dates, so
/// this only covers clock skew.
///
/// Both boundaries are inclusive, and the overdue check runs first: an item
/// at exactly its interval is `Required`, not `Approaching`.
pub fn evaluate_due(
  now:              DateTime<Utc>,
  last_replaced_at: DateTime<Utc>,
  interval_hours:   u32,
  notice_hours:     u32,
) -> Result<Option<DueEvaluation>> {
  if interval_hours == 0 {
    return Err(Error::InvalidInterval);
  }
  if notice_hours == 0 {
    return Err(Error::InvalidNoticeHours);
  }

  let elapsed = hours_between(last_replaced_at, now).max(0.0);
  let interval = f64::from(interval_hours);
  let remaining = interval - elapsed;

  if elapsed >= interval {
    return Ok(Some(DueEvaluation {
      urgency:         Urgency::Required,
      hours_until_due: -(elapsed - interval),
    }));
  }

  if remaining > 0.0 && remaining <= f64::from(notice_hours) {
    return Ok(Some(DueEvaluation {
      urgency:         Urgency::Approaching,
      hours_until_due: remaining,
    }));
  }

  Ok(None)
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
  (to - from).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn far_from_due_yields_none() {
    let last = now() - Duration::hours(500);
    let result = evaluate_due(now(), last, 1000, 24).unwrap();
    assert!(result.is_none());
  }

  #[test]
  fn within_lead_time_is_approaching() {
    let last = now() - Duration::hours(980);
    let eval = evaluate_due(now(), last, 1000, 24).unwrap().unwrap();
    assert_eq!(eval.urgency, Urgency::Approaching);
    assert!((eval.hours_until_due - 20.0).abs() < 1e-9);
  }

  #[test]
  fn past_interval_is_required_with_overdue_magnitude() {
    let last = now() - Duration::hours(1005);
    let eval = evaluate_due(now(), last, 1000, 24).unwrap().unwrap();
    assert_eq!(eval.urgency, Urgency::Required);
    assert!((eval.hours_until_due + 5.0).abs() < 1e-9);
  }

  #[test]
  fn remaining_equal_to_lead_time_is_inclusive() {
    let last = now() - Duration::hours(976);
    let eval = evaluate_due(now(), last, 1000, 24).unwrap().unwrap();
    assert_eq!(eval.urgency, Urgency::Approaching);
    assert!((eval.hours_until_due - 24.0).abs() < 1e-9);
  }

  #[test]
  fn just_outside_lead_time_yields_none() {
    let last = now() - Duration::hours(975);
    let result = evaluate_due(now(), last, 1000, 24).unwrap();
    assert!(result.is_none());
  }

  #[test]
  fn elapsed_equal_to_interval_is_required_not_approaching() {
    let last = now() - Duration::hours(1000);
    let eval = evaluate_due(now(), last, 1000, 24).unwrap().unwrap();
    assert_eq!(eval.urgency, Urgency::Required);
    assert_eq!(eval.hours_until_due, 0.0);
  }

  #[test]
  fn future_replacement_date_clamps_to_zero_elapsed() {
    let last = now() + Duration::hours(3);
    let result = evaluate_due(now(), last, 1000, 24).unwrap();
    assert!(result.is_none());
  }

  #[test]
  fn future_replacement_date_with_tiny_interval_is_not_due() {
    // Even an interval shorter than the skew stays not-due: elapsed is 0.
    let last = now() + Duration::hours(48);
    let result = evaluate_due(now(), last, 24, 12).unwrap();
    assert!(result.is_none());
  }

  #[test]
  fn zero_interval_is_rejected() {
    let last = now() - Duration::hours(10);
    let err = evaluate_due(now(), last, 0, 24).unwrap_err();
    assert!(matches!(err, Error::InvalidInterval));
  }

  #[test]
  fn zero_lead_time_is_rejected() {
    let last = now() - Duration::hours(10);
    let err = evaluate_due(now(), last, 1000, 0).unwrap_err();
    assert!(matches!(err, Error::InvalidNoticeHours));
  }

  #[test]
  fn fractional_hours_are_preserved() {
    let last = now() - Duration::minutes(990 * 60 + 30);
    let eval = evaluate_due(now(), last, 1000, 24).unwrap().unwrap();
    assert_eq!(eval.urgency, Urgency::Approaching);
    assert!((eval.hours_until_due - 9.5).abs() < 1e-9);
  }
}
