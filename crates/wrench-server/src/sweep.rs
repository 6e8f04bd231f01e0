//! The periodic sweep trigger.
//!
//! `GET /cron/sweep?secret=...` is meant to be hit on a fixed interval by an
//! external scheduler. The engine holds no timer state, and reconciliation
//! is idempotent, so overlapping or redundant triggers are harmless.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use wrench_core::store::MaintenanceStore;
use wrench_engine::{Mailer, SweepSummary};

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
pub struct SweepParams {
  pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
  success:   bool,
  timestamp: DateTime<Utc>,
  #[serde(flatten)]
  summary:   SweepSummary,
}

/// `GET /cron/sweep`
///
/// 401 when a secret is configured and the query value mismatches; 200 with
/// the sweep summary; 500 when the sweep itself fails.
pub async fn handler<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<SweepParams>,
) -> Response
where
  S: MaintenanceStore + 'static,
  M: Mailer + 'static,
{
  if let Some(expected) = &state.config.sweep_secret
    && !secrets_match(params.secret.as_deref(), expected)
  {
    return Error::Unauthorized.into_response();
  }

  match state.engine.run_sweep().await {
    Ok(summary) => (
      StatusCode::OK,
      Json(SweepResponse {
        success: true,
        timestamp: Utc::now(),
        summary,
      }),
    )
      .into_response(),
    Err(err) => {
      tracing::error!(error = %err, "sweep failed");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
          "success": false,
          "error": "sweep failed",
          "timestamp": Utc::now(),
        })),
      )
        .into_response()
    }
  }
}

/// Compare the provided secret against the configured one.
///
/// Digest equality keeps the comparison cost independent of where the
/// strings first diverge.
fn secrets_match(provided: Option<&str>, expected: &str) -> bool {
  let Some(provided) = provided else {
    return false;
  };
  Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matching_secret_passes() {
    assert!(secrets_match(Some("hunter2"), "hunter2"));
  }

  #[test]
  fn wrong_secret_fails() {
    assert!(!secrets_match(Some("hunter3"), "hunter2"));
  }

  #[test]
  fn missing_secret_fails() {
    assert!(!secrets_match(None, "hunter2"));
  }
}
