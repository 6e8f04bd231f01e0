//! The `MaintenanceStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `wrench-store-sqlite`).
//! Higher layers (`wrench-engine`, `wrench-api`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Lookups that can miss return `Option` rather than an error so callers can
//! map "not there" to their own boundary (HTTP 404, sweep skip) without
//! inspecting backend error types. The same convention covers guarded
//! writes: `create_active_notification` returns `None` when another
//! reconciliation already holds the item's active slot, and
//! `start_work`/`complete_work` return `None` when their precondition
//! (active / in-progress) no longer holds.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  item::{MaintenanceItem, MaintenanceItemUpdate, NewMaintenanceItem},
  machine::{Machine, MachineUpdate, NewMachine},
  notify::{NewNotification, Notification},
  work::WorkOrder,
};

/// Abstraction over a Wrench storage backend.
///
/// The backend owns the single-active-notification invariant: no sequence of
/// calls, concurrent or not, may leave two `Active` notifications for one
/// item. `create_active_notification` must therefore be an atomic
/// check-then-insert.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MaintenanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Machines ──────────────────────────────────────────────────────────

  /// Create and persist a new machine. Fails if the serial number is taken.
  fn add_machine(
    &self,
    input: NewMachine,
  ) -> impl Future<Output = Result<Machine, Self::Error>> + Send + '_;

  /// Retrieve a machine by UUID. Returns `None` if not found.
  fn get_machine(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Machine>, Self::Error>> + Send + '_;

  /// Look up a machine by its serial number.
  fn machine_by_serial<'a>(
    &'a self,
    serial: &'a str,
  ) -> impl Future<Output = Result<Option<Machine>, Self::Error>> + Send + 'a;

  /// List all machines, most recently created first.
  fn list_machines(
    &self,
  ) -> impl Future<Output = Result<Vec<Machine>, Self::Error>> + Send + '_;

  /// List machines that have at least one maintenance item — the working
  /// set of a sweep.
  fn machines_with_items(
    &self,
  ) -> impl Future<Output = Result<Vec<Machine>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the machine does not exist.
  fn update_machine(
    &self,
    id: Uuid,
    update: MachineUpdate,
  ) -> impl Future<Output = Result<Option<Machine>, Self::Error>> + Send + '_;

  /// Delete a machine, cascading its items, notifications, and work orders.
  /// Returns `false` if the machine did not exist.
  fn delete_machine(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Maintenance items ─────────────────────────────────────────────────

  /// Create and persist a new maintenance item on an existing machine.
  fn add_item(
    &self,
    input: NewMaintenanceItem,
  ) -> impl Future<Output = Result<MaintenanceItem, Self::Error>> + Send + '_;

  /// Retrieve an item by UUID. Returns `None` if not found.
  fn get_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<MaintenanceItem>, Self::Error>>
  + Send
  + '_;

  /// List a machine's items, most recently created first.
  fn list_items(
    &self,
    machine_id: Uuid,
  ) -> impl Future<Output = Result<Vec<MaintenanceItem>, Self::Error>>
  + Send
  + '_;

  /// Apply a partial update. Returns `None` if the item does not exist.
  fn update_item(
    &self,
    id: Uuid,
    update: MaintenanceItemUpdate,
  ) -> impl Future<Output = Result<Option<MaintenanceItem>, Self::Error>>
  + Send
  + '_;

  /// Delete an item, cascading its notifications. Returns `false` if the
  /// item did not exist.
  fn delete_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Retrieve a notification by UUID, whatever its status.
  fn get_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>>
  + Send
  + '_;

  /// The item's current `Active` notification, if any.
  fn active_notification(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>>
  + Send
  + '_;

  /// All `Active` notifications, `Required` first, then newest first.
  fn list_active_notifications(
    &self,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Atomically create an `Active` notification for an item.
  ///
  /// Returns `None` without writing when the item already has an active
  /// notification — the caller lost a reconciliation race and should
  /// re-read state.
  fn create_active_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>>
  + Send
  + '_;

  /// Raise an active notification's urgency to `Required` in place.
  /// Returns `None` if the notification is missing or no longer active.
  fn escalate_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>>
  + Send
  + '_;

  /// Move an active notification to `Retired`. Returns `None` if the
  /// notification is missing or no longer active.
  fn retire_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>>
  + Send
  + '_;

  // ── Work orders ───────────────────────────────────────────────────────

  /// Open a work order from an `Active` notification, transitioning the
  /// notification to `WorkStarted`. One transaction; returns `None` if the
  /// notification is missing or not active.
  fn start_work(
    &self,
    notification_id: Uuid,
  ) -> impl Future<
    Output = Result<Option<(Notification, WorkOrder)>, Self::Error>,
  > + Send
  + '_;

  /// Complete an in-progress work order: set the item's `last_replaced_at`,
  /// delete the linked notification, and mark the order completed. One
  /// transaction; returns `None` if the order is missing or already
  /// completed.
  fn complete_work(
    &self,
    work_order_id: Uuid,
    last_replaced_at: DateTime<Utc>,
    comment: Option<String>,
  ) -> impl Future<Output = Result<Option<WorkOrder>, Self::Error>> + Send + '_;

  /// A machine's work orders, most recently started first.
  fn list_work_orders(
    &self,
    machine_id: Uuid,
  ) -> impl Future<Output = Result<Vec<WorkOrder>, Self::Error>> + Send + '_;
}
