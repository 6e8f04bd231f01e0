//! [`NotificationEngine`] — applies the pure evaluation/reconciliation
//! pipeline to stored state, one machine at a time.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use wrench_core::{
  item::MaintenanceItem,
  machine::Machine,
  notify::{NewNotification, Notification},
  reconcile::{LifecycleAction, reconcile},
  schedule::{DueEvaluation, evaluate_due},
  store::MaintenanceStore,
};

use crate::{Error, Result, mailer::Mailer};

// ─── Output types ────────────────────────────────────────────────────────────

/// A notification created during evaluation, bundled with the context the
/// delivery collaborator needs. Escalations and keeps never produce one.
#[derive(Debug, Clone)]
pub struct CreatedNotice {
  pub machine:      Machine,
  pub item:         MaintenanceItem,
  pub notification: Notification,
  pub evaluation:   DueEvaluation,
}

/// Per-machine entry in a [`SweepSummary`]; only machines with at least one
/// creation appear.
#[derive(Debug, Clone, Serialize)]
pub struct MachineSweepDetail {
  pub machine_id:            Uuid,
  pub machine_name:          String,
  pub notifications_created: usize,
}

/// Aggregate outcome of one sweep over all machines with items.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
  pub machines_checked:      usize,
  pub notifications_created: usize,
  pub details:               Vec<MachineSweepDetail>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Evaluates machines and reconciles their notification state.
///
/// Stateless apart from its collaborators; safe to invoke concurrently and
/// redundantly, because reconciliation is idempotent and the store enforces
/// the single-active invariant atomically.
pub struct NotificationEngine<S, M> {
  store:  Arc<S>,
  mailer: Arc<M>,
}

impl<S, M> NotificationEngine<S, M>
where
  S: MaintenanceStore,
  M: Mailer,
{
  pub fn new(store: Arc<S>, mailer: Arc<M>) -> Self {
    Self { store, mailer }
  }

  /// Evaluate every maintenance item on one machine and apply the resulting
  /// lifecycle actions.
  ///
  /// Returns the notifications created by this call — the only results that
  /// trigger delivery. A failure on one item is logged and does not abort
  /// the remaining items; a delivery failure is logged and does not undo the
  /// creation.
  pub async fn evaluate_machine(
    &self,
    machine_id: Uuid,
  ) -> Result<Vec<CreatedNotice>> {
    let machine = self
      .store
      .get_machine(machine_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MachineNotFound(machine_id))?;

    let items = self
      .store
      .list_items(machine_id)
      .await
      .map_err(Error::store)?;

    let mut created = Vec::new();
    for item in items {
      match self.reconcile_item(&machine, &item).await {
        Ok(Some(notice)) => created.push(notice),
        Ok(None) => {}
        Err(err) => {
          tracing::warn!(
            machine_id = %machine.machine_id,
            item_id = %item.item_id,
            error = %err,
            "skipping item after reconciliation failure"
          );
        }
      }
    }

    for notice in &created {
      if let Err(err) = self
        .mailer
        .send_due_notice(
          &notice.machine,
          &notice.item,
          &notice.notification,
          &notice.evaluation,
        )
        .await
      {
        tracing::warn!(
          notification_id = %notice.notification.notification_id,
          error = %err,
          "notification delivery failed"
        );
      }
    }

    Ok(created)
  }

  /// Evaluate and reconcile a single item. Returns the created notice when
  /// the action was a creation.
  ///
  /// A lost creation race (another reconciliation filled the active slot
  /// between our read and our insert) is retried once against fresh state;
  /// a second loss is an error the caller logs and skips.
  async fn reconcile_item(
    &self,
    machine: &Machine,
    item: &MaintenanceItem,
  ) -> Result<Option<CreatedNotice>> {
    let evaluation = evaluate_due(
      Utc::now(),
      item.last_replaced_at,
      item.interval_hours,
      machine.notice_hours,
    )?;

    let mut attempts = 0;
    loop {
      attempts += 1;

      let active = self
        .store
        .active_notification(item.item_id)
        .await
        .map_err(Error::store)?;

      match reconcile(evaluation.as_ref(), active.as_ref()) {
        LifecycleAction::Create { urgency } => {
          // reconcile only yields Create when an evaluation is present.
          let Some(evaluation) = evaluation else {
            return Ok(None);
          };
          let input = NewNotification {
            machine_id: machine.machine_id,
            item_id:    item.item_id,
            category:   item.category,
            urgency,
          };
          match self
            .store
            .create_active_notification(input)
            .await
            .map_err(Error::store)?
          {
            Some(notification) => {
              return Ok(Some(CreatedNotice {
                machine: machine.clone(),
                item: item.clone(),
                notification,
                evaluation,
              }));
            }
            None if attempts < 2 => {
              tracing::debug!(
                item_id = %item.item_id,
                "lost creation race; reconciling against fresh state"
              );
              continue;
            }
            None => {
              return Err(
                wrench_core::Error::ActiveNotificationExists(item.item_id)
                  .into(),
              );
            }
          }
        }
        LifecycleAction::Escalate { notification_id } => {
          self
            .store
            .escalate_notification(notification_id)
            .await
            .map_err(Error::store)?;
          return Ok(None);
        }
        LifecycleAction::Retire { notification_id } => {
          self
            .store
            .retire_notification(notification_id)
            .await
            .map_err(Error::store)?;
          return Ok(None);
        }
        LifecycleAction::Keep => return Ok(None),
      }
    }
  }

  /// Evaluate every machine that has at least one maintenance item.
  ///
  /// A failure on one machine is logged and the sweep continues; the summary
  /// reports what actually happened.
  pub async fn run_sweep(&self) -> Result<SweepSummary> {
    let machines = self
      .store
      .machines_with_items()
      .await
      .map_err(Error::store)?;

    let mut summary = SweepSummary {
      machines_checked:      machines.len(),
      notifications_created: 0,
      details:               Vec::new(),
    };

    for machine in machines {
      match self.evaluate_machine(machine.machine_id).await {
        Ok(created) => {
          if !created.is_empty() {
            summary.notifications_created += created.len();
            summary.details.push(MachineSweepDetail {
              machine_id:            machine.machine_id,
              machine_name:          machine.name,
              notifications_created: created.len(),
            });
          }
        }
        Err(err) => {
          tracing::warn!(
            machine_id = %machine.machine_id,
            error = %err,
            "sweep: skipping machine"
          );
        }
      }
    }

    tracing::info!(
      machines_checked = summary.machines_checked,
      notifications_created = summary.notifications_created,
      "sweep finished"
    );

    Ok(summary)
  }
}
