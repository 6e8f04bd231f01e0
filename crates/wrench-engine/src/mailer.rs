//! The delivery collaborator.
//!
//! Delivery is best-effort: the engine persists notifications first and
//! treats a failed send as a log line, never a rollback. The trait is
//! injected so tests can record or fail sends deterministically.

use std::{convert::Infallible, future::Future};

use wrench_core::{
  item::MaintenanceItem,
  machine::Machine,
  notify::{Notification, Urgency},
  schedule::DueEvaluation,
};

/// Sends the alert for one newly created notification.
pub trait Mailer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send_due_notice(
    &self,
    machine: &Machine,
    item: &MaintenanceItem,
    notification: &Notification,
    evaluation: &DueEvaluation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Subject line for a due notice.
pub fn render_subject(
  machine: &Machine,
  item: &MaintenanceItem,
  notification: &Notification,
) -> String {
  let verb = match notification.urgency {
    Urgency::Required => "Required",
    Urgency::Approaching => "Approaching",
  };
  format!("Service {verb}: {} - {}", machine.name, item.name)
}

/// Body text for a due notice.
pub fn render_body(
  machine: &Machine,
  item: &MaintenanceItem,
  evaluation: &DueEvaluation,
) -> String {
  let due_line = if evaluation.hours_until_due < 0.0 {
    format!("Overdue by: {:.1} hours", -evaluation.hours_until_due)
  } else {
    format!("Due in: {:.1} hours", evaluation.hours_until_due)
  };
  format!(
    "Machine: {}\n\
     Serial number: {}\n\
     Maintenance: {}\n\
     {due_line}\n\
     Replacement interval: {} hours\n\
     Last replaced: {}",
    machine.name,
    machine.serial_number,
    item.name,
    item.interval_hours,
    item.last_replaced_at.format("%Y-%m-%d"),
  )
}

// ─── LogMailer ───────────────────────────────────────────────────────────────

/// A mailer that writes the rendered notice to the log instead of a wire.
///
/// Stands in until a real transport is wired up; the engine is oblivious
/// either way.
#[derive(Debug, Clone)]
pub struct LogMailer {
  recipient: String,
}

impl LogMailer {
  pub fn new(recipient: impl Into<String>) -> Self {
    Self { recipient: recipient.into() }
  }
}

impl Mailer for LogMailer {
  type Error = Infallible;

  async fn send_due_notice(
    &self,
    machine: &Machine,
    item: &MaintenanceItem,
    notification: &Notification,
    evaluation: &DueEvaluation,
  ) -> Result<(), Self::Error> {
    tracing::info!(
      to = %self.recipient,
      subject = %render_subject(machine, item, notification),
      body = %render_body(machine, item, evaluation),
      "notification email"
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;
  use wrench_core::notify::{NotificationStatus, ServiceCategory};

  use super::*;

  fn fixtures(urgency: Urgency) -> (Machine, MaintenanceItem, Notification) {
    let machine = Machine {
      machine_id:      Uuid::new_v4(),
      name:            "Press 3".into(),
      serial_number:   "SN-100".into(),
      catalog_link:    None,
      operating_hours: 0,
      notice_hours:    24,
      created_at:      Utc::now(),
    };
    let item = MaintenanceItem {
      item_id:          Uuid::new_v4(),
      machine_id:       machine.machine_id,
      name:             "Gearbox oil".into(),
      category:         ServiceCategory::Oil,
      interval_hours:   1000,
      last_replaced_at: Utc::now(),
      created_at:       Utc::now(),
    };
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      machine_id:      machine.machine_id,
      item_id:         item.item_id,
      category:        item.category,
      urgency,
      status:          NotificationStatus::Active,
      triggered_at:    Utc::now(),
    };
    (machine, item, notification)
  }

  #[test]
  fn subject_names_machine_item_and_urgency() {
    let (machine, item, notification) = fixtures(Urgency::Required);
    let subject = render_subject(&machine, &item, &notification);
    assert_eq!(subject, "Service Required: Press 3 - Gearbox oil");
  }

  #[test]
  fn body_shows_overdue_magnitude() {
    let (machine, item, _) = fixtures(Urgency::Required);
    let body = render_body(&machine, &item, &DueEvaluation {
      urgency:         Urgency::Required,
      hours_until_due: -5.0,
    });
    assert!(body.contains("Overdue by: 5.0 hours"), "body: {body}");
    assert!(body.contains("Serial number: SN-100"));
  }

  #[test]
  fn body_shows_remaining_hours_when_approaching() {
    let (machine, item, _) = fixtures(Urgency::Approaching);
    let body = render_body(&machine, &item, &DueEvaluation {
      urgency:         Urgency::Approaching,
      hours_until_due: 20.0,
    });
    assert!(body.contains("Due in: 20.0 hours"), "body: {body}");
  }
}
