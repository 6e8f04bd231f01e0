//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum columns are stored as
//! the same snake_case strings serde uses on the wire. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use wrench_core::{
  item::MaintenanceItem,
  machine::Machine,
  notify::{Notification, NotificationStatus, ServiceCategory, Urgency},
  work::{WorkOrder, WorkOrderStatus},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ServiceCategory ─────────────────────────────────────────────────────────

pub fn encode_category(c: ServiceCategory) -> &'static str {
  match c {
    ServiceCategory::Part => "part",
    ServiceCategory::Oil => "oil",
  }
}

pub fn decode_category(s: &str) -> Result<ServiceCategory> {
  match s {
    "part" => Ok(ServiceCategory::Part),
    "oil" => Ok(ServiceCategory::Oil),
    other => Err(Error::UnknownDiscriminant {
      column: "category",
      value:  other.to_owned(),
    }),
  }
}

// ─── Urgency ─────────────────────────────────────────────────────────────────

pub fn encode_urgency(u: Urgency) -> &'static str {
  match u {
    Urgency::Approaching => "approaching",
    Urgency::Required => "required",
  }
}

pub fn decode_urgency(s: &str) -> Result<Urgency> {
  match s {
    "approaching" => Ok(Urgency::Approaching),
    "required" => Ok(Urgency::Required),
    other => Err(Error::UnknownDiscriminant {
      column: "urgency",
      value:  other.to_owned(),
    }),
  }
}

// ─── NotificationStatus ──────────────────────────────────────────────────────

pub fn encode_notification_status(s: NotificationStatus) -> &'static str {
  match s {
    NotificationStatus::Active => "active",
    NotificationStatus::WorkStarted => "work_started",
    NotificationStatus::Retired => "retired",
  }
}

pub fn decode_notification_status(s: &str) -> Result<NotificationStatus> {
  match s {
    "active" => Ok(NotificationStatus::Active),
    "work_started" => Ok(NotificationStatus::WorkStarted),
    "retired" => Ok(NotificationStatus::Retired),
    other => Err(Error::UnknownDiscriminant {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

// ─── WorkOrderStatus ─────────────────────────────────────────────────────────

pub fn encode_work_order_status(s: WorkOrderStatus) -> &'static str {
  match s {
    WorkOrderStatus::InProgress => "in_progress",
    WorkOrderStatus::Completed => "completed",
  }
}

pub fn decode_work_order_status(s: &str) -> Result<WorkOrderStatus> {
  match s {
    "in_progress" => Ok(WorkOrderStatus::InProgress),
    "completed" => Ok(WorkOrderStatus::Completed),
    other => Err(Error::UnknownDiscriminant {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `machines` row.
pub struct RawMachine {
  pub machine_id:      String,
  pub name:            String,
  pub serial_number:   String,
  pub catalog_link:    Option<String>,
  pub operating_hours: u32,
  pub notice_hours:    u32,
  pub created_at:      String,
}

impl RawMachine {
  pub fn into_machine(self) -> Result<Machine> {
    Ok(Machine {
      machine_id:      decode_uuid(&self.machine_id)?,
      name:            self.name,
      serial_number:   self.serial_number,
      catalog_link:    self.catalog_link,
      operating_hours: self.operating_hours,
      notice_hours:    self.notice_hours,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub item_id:          String,
  pub machine_id:       String,
  pub name:             String,
  pub category:         String,
  pub interval_hours:   u32,
  pub last_replaced_at: String,
  pub created_at:       String,
}

impl RawItem {
  pub fn into_item(self) -> Result<MaintenanceItem> {
    Ok(MaintenanceItem {
      item_id:          decode_uuid(&self.item_id)?,
      machine_id:       decode_uuid(&self.machine_id)?,
      name:             self.name,
      category:         decode_category(&self.category)?,
      interval_hours:   self.interval_hours,
      last_replaced_at: decode_dt(&self.last_replaced_at)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub machine_id:      String,
  pub item_id:         String,
  pub category:        String,
  pub urgency:         String,
  pub status:          String,
  pub triggered_at:    String,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      machine_id:      decode_uuid(&self.machine_id)?,
      item_id:         decode_uuid(&self.item_id)?,
      category:        decode_category(&self.category)?,
      urgency:         decode_urgency(&self.urgency)?,
      status:          decode_notification_status(&self.status)?,
      triggered_at:    decode_dt(&self.triggered_at)?,
    })
  }
}

/// Raw values read directly from a `work_orders` row.
pub struct RawWorkOrder {
  pub work_order_id:   String,
  pub machine_id:      String,
  pub item_id:         String,
  pub notification_id: Option<String>,
  pub status:          String,
  pub started_at:      String,
  pub completed_at:    Option<String>,
  pub comment:         Option<String>,
}

impl RawWorkOrder {
  pub fn into_work_order(self) -> Result<WorkOrder> {
    Ok(WorkOrder {
      work_order_id:   decode_uuid(&self.work_order_id)?,
      machine_id:      decode_uuid(&self.machine_id)?,
      item_id:         decode_uuid(&self.item_id)?,
      notification_id: self
        .notification_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      status:          decode_work_order_status(&self.status)?,
      started_at:      decode_dt(&self.started_at)?,
      completed_at:    self.completed_at.as_deref().map(decode_dt).transpose()?,
      comment:         self.comment,
    })
  }
}
