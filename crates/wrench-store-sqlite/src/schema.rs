//! SQL schema for the Wrench SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS machines (
    machine_id      TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    serial_number   TEXT NOT NULL UNIQUE,
    catalog_link    TEXT,
    operating_hours INTEGER NOT NULL DEFAULT 0,
    notice_hours    INTEGER NOT NULL,
    created_at      TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS items (
    item_id          TEXT PRIMARY KEY,
    machine_id       TEXT NOT NULL REFERENCES machines(machine_id) ON DELETE CASCADE,
    name             TEXT NOT NULL,
    category         TEXT NOT NULL,   -- 'part' | 'oil'
    interval_hours   INTEGER NOT NULL,
    last_replaced_at TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    machine_id      TEXT NOT NULL REFERENCES machines(machine_id) ON DELETE CASCADE,
    item_id         TEXT NOT NULL REFERENCES items(item_id) ON DELETE CASCADE,
    category        TEXT NOT NULL,   -- 'part' | 'oil'
    urgency         TEXT NOT NULL,   -- 'approaching' | 'required'
    status          TEXT NOT NULL,   -- 'active' | 'work_started' | 'retired'
    triggered_at    TEXT NOT NULL
);

-- The single-active invariant. Concurrent reconciliations race on this
-- index; the loser's conditional insert changes no rows.
CREATE UNIQUE INDEX IF NOT EXISTS notifications_one_active_idx
    ON notifications(item_id) WHERE status = 'active';

CREATE TABLE IF NOT EXISTS work_orders (
    work_order_id   TEXT PRIMARY KEY,
    machine_id      TEXT NOT NULL REFERENCES machines(machine_id) ON DELETE CASCADE,
    item_id         TEXT NOT NULL REFERENCES items(item_id) ON DELETE CASCADE,
    notification_id TEXT REFERENCES notifications(notification_id) ON DELETE SET NULL,
    status          TEXT NOT NULL,   -- 'in_progress' | 'completed'
    started_at      TEXT NOT NULL,
    completed_at    TEXT,
    comment         TEXT
);

CREATE INDEX IF NOT EXISTS items_machine_idx        ON items(machine_id);
CREATE INDEX IF NOT EXISTS notifications_item_idx   ON notifications(item_id);
CREATE INDEX IF NOT EXISTS notifications_status_idx ON notifications(status);
CREATE INDEX IF NOT EXISTS work_orders_machine_idx  ON work_orders(machine_id);

PRAGMA user_version = 1;
";
