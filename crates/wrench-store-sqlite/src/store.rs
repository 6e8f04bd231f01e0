//! [`SqliteStore`] — the SQLite implementation of [`MaintenanceStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use wrench_core::{
  item::{MaintenanceItem, MaintenanceItemUpdate, NewMaintenanceItem},
  machine::{Machine, MachineUpdate, NewMachine},
  notify::{NewNotification, Notification, NotificationStatus},
  store::MaintenanceStore,
  work::{WorkOrder, WorkOrderStatus},
};

use crate::{
  Error, Result,
  encode::{
    RawItem, RawMachine, RawNotification, RawWorkOrder, encode_category,
    encode_dt, encode_urgency, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

const MACHINE_COLS: &str = "machine_id, name, serial_number, catalog_link, \
                            operating_hours, notice_hours, created_at";

const ITEM_COLS: &str = "item_id, machine_id, name, category, \
                         interval_hours, last_replaced_at, created_at";

const NOTIFICATION_COLS: &str = "notification_id, machine_id, item_id, \
                                 category, urgency, status, triggered_at";

const WORK_ORDER_COLS: &str = "work_order_id, machine_id, item_id, \
                               notification_id, status, started_at, \
                               completed_at, comment";

fn machine_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMachine> {
  Ok(RawMachine {
    machine_id:      row.get(0)?,
    name:            row.get(1)?,
    serial_number:   row.get(2)?,
    catalog_link:    row.get(3)?,
    operating_hours: row.get(4)?,
    notice_hours:    row.get(5)?,
    created_at:      row.get(6)?,
  })
}

fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawItem> {
  Ok(RawItem {
    item_id:          row.get(0)?,
    machine_id:       row.get(1)?,
    name:             row.get(2)?,
    category:         row.get(3)?,
    interval_hours:   row.get(4)?,
    last_replaced_at: row.get(5)?,
    created_at:       row.get(6)?,
  })
}

fn notification_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawNotification> {
  Ok(RawNotification {
    notification_id: row.get(0)?,
    machine_id:      row.get(1)?,
    item_id:         row.get(2)?,
    category:        row.get(3)?,
    urgency:         row.get(4)?,
    status:          row.get(5)?,
    triggered_at:    row.get(6)?,
  })
}

fn work_order_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawWorkOrder> {
  Ok(RawWorkOrder {
    work_order_id:   row.get(0)?,
    machine_id:      row.get(1)?,
    item_id:         row.get(2)?,
    notification_id: row.get(3)?,
    status:          row.get(4)?,
    started_at:      row.get(5)?,
    completed_at:    row.get(6)?,
    comment:         row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Wrench store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_notification(
    &self,
    id: Uuid,
  ) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {NOTIFICATION_COLS} FROM notifications \
                 WHERE notification_id = ?1"
              ),
              rusqlite::params![id_str],
              notification_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }
}

// ─── MaintenanceStore impl ───────────────────────────────────────────────────

impl MaintenanceStore for SqliteStore {
  type Error = Error;

  // ── Machines ──────────────────────────────────────────────────────────────

  async fn add_machine(&self, input: NewMachine) -> Result<Machine> {
    let machine = Machine {
      machine_id:      Uuid::new_v4(),
      name:            input.name,
      serial_number:   input.serial_number,
      catalog_link:    input.catalog_link,
      operating_hours: input.operating_hours,
      notice_hours:    input.notice_hours,
      created_at:      Utc::now(),
    };

    let id_str = encode_uuid(machine.machine_id);
    let at_str = encode_dt(machine.created_at);
    let name = machine.name.clone();
    let serial = machine.serial_number.clone();
    let catalog = machine.catalog_link.clone();
    let operating = machine.operating_hours;
    let notice = machine.notice_hours;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO machines (
             machine_id, name, serial_number, catalog_link,
             operating_hours, notice_hours, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, name, serial, catalog, operating, notice, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(machine)
  }

  async fn get_machine(&self, id: Uuid) -> Result<Option<Machine>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMachine> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {MACHINE_COLS} FROM machines WHERE machine_id = ?1"
              ),
              rusqlite::params![id_str],
              machine_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMachine::into_machine).transpose()
  }

  async fn machine_by_serial(&self, serial: &str) -> Result<Option<Machine>> {
    let serial = serial.to_owned();

    let raw: Option<RawMachine> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {MACHINE_COLS} FROM machines WHERE serial_number = ?1"
              ),
              rusqlite::params![serial],
              machine_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMachine::into_machine).transpose()
  }

  async fn list_machines(&self) -> Result<Vec<Machine>> {
    let raws: Vec<RawMachine> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MACHINE_COLS} FROM machines ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], machine_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMachine::into_machine).collect()
  }

  async fn machines_with_items(&self) -> Result<Vec<Machine>> {
    let raws: Vec<RawMachine> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MACHINE_COLS} FROM machines m
           WHERE EXISTS (
             SELECT 1 FROM items i WHERE i.machine_id = m.machine_id
           )
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], machine_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMachine::into_machine).collect()
  }

  async fn update_machine(
    &self,
    id: Uuid,
    update: MachineUpdate,
  ) -> Result<Option<Machine>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMachine> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing = tx
          .query_row(
            &format!(
              "SELECT {MACHINE_COLS} FROM machines WHERE machine_id = ?1"
            ),
            rusqlite::params![id_str],
            machine_from_row,
          )
          .optional()?;

        let Some(mut raw) = existing else {
          return Ok(None);
        };

        if let Some(name) = update.name {
          raw.name = name;
        }
        if let Some(serial) = update.serial_number {
          raw.serial_number = serial;
        }
        if let Some(hours) = update.operating_hours {
          raw.operating_hours = hours;
        }
        if let Some(notice) = update.notice_hours {
          raw.notice_hours = notice;
        }

        tx.execute(
          "UPDATE machines
           SET name = ?2, serial_number = ?3, operating_hours = ?4,
               notice_hours = ?5
           WHERE machine_id = ?1",
          rusqlite::params![
            id_str,
            raw.name,
            raw.serial_number,
            raw.operating_hours,
            raw.notice_hours,
          ],
        )?;
        tx.commit()?;

        Ok(Some(raw))
      })
      .await?;

    raw.map(RawMachine::into_machine).transpose()
  }

  async fn delete_machine(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM machines WHERE machine_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  // ── Maintenance items ─────────────────────────────────────────────────────

  async fn add_item(&self, input: NewMaintenanceItem) -> Result<MaintenanceItem> {
    let item = MaintenanceItem {
      item_id:          Uuid::new_v4(),
      machine_id:       input.machine_id,
      name:             input.name,
      category:         input.category,
      interval_hours:   input.interval_hours,
      last_replaced_at: input.last_replaced_at,
      created_at:       Utc::now(),
    };

    let id_str = encode_uuid(item.item_id);
    let machine_id_str = encode_uuid(item.machine_id);
    let name = item.name.clone();
    let category = encode_category(item.category).to_owned();
    let interval = item.interval_hours;
    let replaced_str = encode_dt(item.last_replaced_at);
    let at_str = encode_dt(item.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (
             item_id, machine_id, name, category,
             interval_hours, last_replaced_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            machine_id_str,
            name,
            category,
            interval,
            replaced_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn get_item(&self, id: Uuid) -> Result<Option<MaintenanceItem>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ITEM_COLS} FROM items WHERE item_id = ?1"),
              rusqlite::params![id_str],
              item_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list_items(&self, machine_id: Uuid) -> Result<Vec<MaintenanceItem>> {
    let machine_id_str = encode_uuid(machine_id);

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLS} FROM items WHERE machine_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![machine_id_str], item_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn update_item(
    &self,
    id: Uuid,
    update: MaintenanceItemUpdate,
  ) -> Result<Option<MaintenanceItem>> {
    let id_str = encode_uuid(id);
    let category = update.category.map(|c| encode_category(c).to_owned());
    let replaced = update.last_replaced_at.map(encode_dt);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing = tx
          .query_row(
            &format!("SELECT {ITEM_COLS} FROM items WHERE item_id = ?1"),
            rusqlite::params![id_str],
            item_from_row,
          )
          .optional()?;

        let Some(mut raw) = existing else {
          return Ok(None);
        };

        if let Some(name) = update.name {
          raw.name = name;
        }
        if let Some(category) = category {
          raw.category = category;
        }
        if let Some(interval) = update.interval_hours {
          raw.interval_hours = interval;
        }
        if let Some(replaced) = replaced {
          raw.last_replaced_at = replaced;
        }

        tx.execute(
          "UPDATE items
           SET name = ?2, category = ?3, interval_hours = ?4,
               last_replaced_at = ?5
           WHERE item_id = ?1",
          rusqlite::params![
            id_str,
            raw.name,
            raw.category,
            raw.interval_hours,
            raw.last_replaced_at,
          ],
        )?;
        tx.commit()?;

        Ok(Some(raw))
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn delete_item(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM items WHERE item_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
    self.fetch_notification(id).await
  }

  async fn active_notification(
    &self,
    item_id: Uuid,
  ) -> Result<Option<Notification>> {
    let item_id_str = encode_uuid(item_id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {NOTIFICATION_COLS} FROM notifications
                 WHERE item_id = ?1 AND status = 'active'"
              ),
              rusqlite::params![item_id_str],
              notification_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }

  async fn list_active_notifications(&self) -> Result<Vec<Notification>> {
    let raws: Vec<RawNotification> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLS} FROM notifications
           WHERE status = 'active'
           ORDER BY CASE urgency WHEN 'required' THEN 0 ELSE 1 END,
                    triggered_at DESC"
        ))?;
        let rows = stmt
          .query_map([], notification_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn create_active_notification(
    &self,
    input: NewNotification,
  ) -> Result<Option<Notification>> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      machine_id:      input.machine_id,
      item_id:         input.item_id,
      category:        input.category,
      urgency:         input.urgency,
      status:          NotificationStatus::Active,
      triggered_at:    Utc::now(),
    };

    let id_str = encode_uuid(notification.notification_id);
    let machine_id_str = encode_uuid(notification.machine_id);
    let item_id_str = encode_uuid(notification.item_id);
    let category = encode_category(notification.category).to_owned();
    let urgency = encode_urgency(notification.urgency).to_owned();
    let at_str = encode_dt(notification.triggered_at);

    // `OR IGNORE` turns a loss on the partial unique index
    // (`notifications_one_active_idx`) into zero changed rows.
    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO notifications (
             notification_id, machine_id, item_id, category,
             urgency, status, triggered_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)",
          rusqlite::params![
            id_str, machine_id_str, item_id_str, category, urgency, at_str,
          ],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted.then_some(notification))
  }

  async fn escalate_notification(
    &self,
    id: Uuid,
  ) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE notifications SET urgency = 'required'
           WHERE notification_id = ?1 AND status = 'active'",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    if !changed {
      return Ok(None);
    }
    self.fetch_notification(id).await
  }

  async fn retire_notification(
    &self,
    id: Uuid,
  ) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE notifications SET status = 'retired'
           WHERE notification_id = ?1 AND status = 'active'",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    if !changed {
      return Ok(None);
    }
    self.fetch_notification(id).await
  }

  // ── Work orders ───────────────────────────────────────────────────────────

  async fn start_work(
    &self,
    notification_id: Uuid,
  ) -> Result<Option<(Notification, WorkOrder)>> {
    let notification_id_str = encode_uuid(notification_id);
    let work_order_id = Uuid::new_v4();
    let work_order_id_str = encode_uuid(work_order_id);
    let started_at = Utc::now();
    let started_at_str = encode_dt(started_at);

    let raws: Option<(RawNotification, RawWorkOrder)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let notification = tx
          .query_row(
            &format!(
              "SELECT {NOTIFICATION_COLS} FROM notifications
               WHERE notification_id = ?1 AND status = 'active'"
            ),
            rusqlite::params![notification_id_str],
            notification_from_row,
          )
          .optional()?;

        let Some(mut notification) = notification else {
          return Ok(None);
        };

        tx.execute(
          "UPDATE notifications SET status = 'work_started'
           WHERE notification_id = ?1",
          rusqlite::params![notification_id_str],
        )?;
        notification.status = "work_started".to_owned();

        tx.execute(
          "INSERT INTO work_orders (
             work_order_id, machine_id, item_id, notification_id,
             status, started_at
           ) VALUES (?1, ?2, ?3, ?4, 'in_progress', ?5)",
          rusqlite::params![
            work_order_id_str,
            notification.machine_id,
            notification.item_id,
            notification_id_str,
            started_at_str,
          ],
        )?;

        let work_order = RawWorkOrder {
          work_order_id:   work_order_id_str,
          machine_id:      notification.machine_id.clone(),
          item_id:         notification.item_id.clone(),
          notification_id: Some(notification_id_str),
          status:          "in_progress".to_owned(),
          started_at:      started_at_str,
          completed_at:    None,
          comment:         None,
        };

        tx.commit()?;
        Ok(Some((notification, work_order)))
      })
      .await?;

    match raws {
      Some((n, w)) => {
        Ok(Some((n.into_notification()?, w.into_work_order()?)))
      }
      None => Ok(None),
    }
  }

  async fn complete_work(
    &self,
    work_order_id: Uuid,
    last_replaced_at: DateTime<Utc>,
    comment: Option<String>,
  ) -> Result<Option<WorkOrder>> {
    let work_order_id_str = encode_uuid(work_order_id);
    let replaced_str = encode_dt(last_replaced_at);
    let completed_at_str = encode_dt(Utc::now());

    let raw: Option<RawWorkOrder> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let work_order = tx
          .query_row(
            &format!(
              "SELECT {WORK_ORDER_COLS} FROM work_orders
               WHERE work_order_id = ?1 AND status = 'in_progress'"
            ),
            rusqlite::params![work_order_id_str],
            work_order_from_row,
          )
          .optional()?;

        let Some(work_order) = work_order else {
          return Ok(None);
        };

        tx.execute(
          "UPDATE items SET last_replaced_at = ?2 WHERE item_id = ?1",
          rusqlite::params![work_order.item_id, replaced_str],
        )?;

        tx.execute(
          "UPDATE work_orders
           SET status = 'completed', completed_at = ?2, comment = ?3
           WHERE work_order_id = ?1",
          rusqlite::params![work_order_id_str, completed_at_str, comment],
        )?;

        // The linked notification is done with; deleting it clears this
        // order's notification_id via ON DELETE SET NULL.
        if let Some(notification_id) = &work_order.notification_id {
          tx.execute(
            "DELETE FROM notifications WHERE notification_id = ?1",
            rusqlite::params![notification_id],
          )?;
        }

        let completed = tx
          .query_row(
            &format!(
              "SELECT {WORK_ORDER_COLS} FROM work_orders
               WHERE work_order_id = ?1"
            ),
            rusqlite::params![work_order_id_str],
            work_order_from_row,
          )
          .optional()?;

        tx.commit()?;
        Ok(completed)
      })
      .await?;

    raw.map(RawWorkOrder::into_work_order).transpose()
  }

  async fn list_work_orders(&self, machine_id: Uuid) -> Result<Vec<WorkOrder>> {
    let machine_id_str = encode_uuid(machine_id);

    let raws: Vec<RawWorkOrder> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {WORK_ORDER_COLS} FROM work_orders
           WHERE machine_id = ?1
           ORDER BY started_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![machine_id_str], work_order_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWorkOrder::into_work_order).collect()
  }
}
