//! Error types for `wrench-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("replacement interval must be a positive number of hours")]
  InvalidInterval,

  #[error("notification lead time must be a positive number of hours")]
  InvalidNoticeHours,

  #[error("machine not found: {0}")]
  MachineNotFound(Uuid),

  #[error("maintenance item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("work order not found: {0}")]
  WorkOrderNotFound(Uuid),

  #[error("notification {0} is not active")]
  NotificationNotActive(Uuid),

  #[error("work order {0} is not in progress")]
  WorkOrderNotOpen(Uuid),

  #[error("a machine with serial number {0:?} already exists")]
  DuplicateSerial(String),

  #[error("item {0} already has an active notification")]
  ActiveNotificationExists(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
