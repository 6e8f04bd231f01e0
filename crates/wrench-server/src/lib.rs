//! HTTP server for the Wrench maintenance tracker.
//!
//! Mounts the JSON API from `wrench-api` behind HTTP Basic auth and exposes
//! the sweep trigger at `/cron/sweep`, guarded by an optional shared secret.

pub mod auth;
pub mod error;
pub mod sweep;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wrench_api::ApiState;
use wrench_core::store::MaintenanceStore;
use wrench_engine::{Mailer, NotificationEngine};

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Shared secret for `/cron/sweep`; when unset the trigger is open.
  pub sweep_secret:       Option<String>,
  /// Recipient address for due notices.
  pub notify_email:       String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub engine: Arc<NotificationEngine<S, M>>,
  pub auth:   Arc<AuthConfig>,
  pub config: Arc<ServerConfig>,
}

// Manual impl: `S`/`M` themselves need not be `Clone`.
impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      engine: self.engine.clone(),
      auth:   self.auth.clone(),
      config: self.config.clone(),
    }
  }
}

impl<S, M> AppState<S, M> {
  fn api_state(&self) -> ApiState<S, M> {
    ApiState {
      store:  self.store.clone(),
      engine: self.engine.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: MaintenanceStore + 'static,
  M: Mailer + 'static,
{
  let api = wrench_api::api_router(state.api_state()).layer(
    middleware::from_fn_with_state(state.auth.clone(), auth::require_auth),
  );

  let trigger = Router::new()
    .route("/cron/sweep", get(sweep::handler::<S, M>))
    .with_state(state);

  Router::new()
    .nest("/api", api)
    .merge(trigger)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use chrono::{Duration, Utc};
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use wrench_engine::LogMailer;
  use wrench_store_sqlite::SqliteStore;

  async fn make_state(
    password: &str,
    sweep_secret: Option<&str>,
  ) -> AppState<SqliteStore, LogMailer> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let engine = Arc::new(NotificationEngine::new(
      store.clone(),
      Arc::new(LogMailer::new("ops@example.com")),
    ));

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store,
      engine,
      auth: Arc::new(AuthConfig {
        username:      "operator".to_string(),
        password_hash: hash.clone(),
      }),
      config: Arc::new(ServerConfig {
        host:               "127.0.0.1".to_string(),
        port:               5480,
        store_path:         PathBuf::from(":memory:"),
        auth_username:      "operator".to_string(),
        auth_password_hash: hash,
        sweep_secret:       sweep_secret.map(str::to_owned),
        notify_email:       "ops@example.com".to_string(),
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_json(
    state:   AppState<SqliteStore, LogMailer>,
    method:  &str,
    uri:     &str,
    auth:    Option<&str>,
    body:    Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  fn machine_body(hours_ago: i64) -> Value {
    json!({
      "name": "Excavator",
      "serial_number": "SN-100",
      "notice_hours": 24,
      "items": [{
        "name": "Hydraulic oil",
        "category": "oil",
        "interval_hours": 1000,
        "last_replaced_at":
          (Utc::now() - Duration::hours(hours_ago)).to_rfc3339(),
      }],
    })
  }

  // ── Auth ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn api_without_credentials_returns_401() {
    let state = make_state("secret", None).await;
    let req = Request::builder()
      .method("GET")
      .uri("/api/machines")
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn api_with_wrong_password_returns_401() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "wrong");
    let (status, _) =
      oneshot_json(state, "GET", "/api/machines", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Machines ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_list_machines() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "secret");

    let (status, created) = oneshot_json(
      state.clone(),
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(100)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["machine"]["serial_number"], "SN-100");
    assert_eq!(created["items"].as_array().unwrap().len(), 1);

    let (status, listed) =
      oneshot_json(state, "GET", "/api/machines", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn create_machine_without_items_returns_400() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "secret");

    let mut body = machine_body(100);
    body["items"] = json!([]);
    let (status, _) =
      oneshot_json(state, "POST", "/api/machines", Some(&auth), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn duplicate_serial_returns_409() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "secret");

    oneshot_json(
      state.clone(),
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(100)),
    )
    .await;
    let (status, _) = oneshot_json(
      state,
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(100)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn future_replacement_date_returns_400() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "secret");

    let (status, _) = oneshot_json(
      state,
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(-48)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Sweep trigger ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn sweep_with_wrong_secret_returns_401() {
    let state = make_state("secret", Some("cron-secret")).await;
    let (status, _) =
      oneshot_json(state, "GET", "/cron/sweep?secret=nope", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn sweep_without_secret_param_returns_401_when_configured() {
    let state = make_state("secret", Some("cron-secret")).await;
    let (status, _) =
      oneshot_json(state, "GET", "/cron/sweep", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn sweep_is_open_when_no_secret_configured() {
    let state = make_state("secret", None).await;
    let (status, body) =
      oneshot_json(state, "GET", "/cron/sweep", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["machines_checked"], 0);
  }

  #[tokio::test]
  async fn sweep_creates_notifications_for_overdue_machines() {
    let state = make_state("secret", Some("cron-secret")).await;
    let auth = auth_header("operator", "secret");

    oneshot_json(
      state.clone(),
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(1005)),
    )
    .await;

    let (status, body) = oneshot_json(
      state.clone(),
      "GET",
      "/cron/sweep?secret=cron-secret",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["machines_checked"], 1);
    assert_eq!(body["notifications_created"], 1);
    assert_eq!(body["details"].as_array().unwrap().len(), 1);

    // A second sweep is a no-op.
    let (_, body) = oneshot_json(
      state,
      "GET",
      "/cron/sweep?secret=cron-secret",
      None,
      None,
    )
    .await;
    assert_eq!(body["notifications_created"], 0);
  }

  // ── Full workflow ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn notification_work_order_lifecycle() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "secret");

    // Overdue machine; sweep fires a Required notification.
    oneshot_json(
      state.clone(),
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(1005)),
    )
    .await;
    oneshot_json(state.clone(), "GET", "/cron/sweep", None, None).await;

    let (_, notifications) = oneshot_json(
      state.clone(),
      "GET",
      "/api/notifications",
      Some(&auth),
      None,
    )
    .await;
    let notifications = notifications.as_array().unwrap().clone();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["urgency"], "required");
    let notification_id = notifications[0]["notification_id"]
      .as_str()
      .unwrap()
      .to_string();

    // Start work.
    let (status, started) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/api/notifications/{notification_id}/start"),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["notification"]["status"], "work_started");
    let work_order_id = started["work_order"]["work_order_id"]
      .as_str()
      .unwrap()
      .to_string();

    // Starting twice fails.
    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/api/notifications/{notification_id}/start"),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Complete the work order with a fresh replacement date.
    let (status, completed) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/api/work-orders/{work_order_id}/complete"),
      Some(&auth),
      Some(json!({
        "last_replaced_at": Utc::now().to_rfc3339(),
        "comment": "oil changed",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    // The alert is gone and the re-evaluated machine is clean.
    let (_, notifications) = oneshot_json(
      state.clone(),
      "GET",
      "/api/notifications",
      Some(&auth),
      None,
    )
    .await;
    assert!(notifications.as_array().unwrap().is_empty());

    // History survives.
    let (_, machines) =
      oneshot_json(state.clone(), "GET", "/api/machines", Some(&auth), None)
        .await;
    let machine_id = machines[0]["machine_id"].as_str().unwrap().to_string();
    let (_, orders) = oneshot_json(
      state,
      "GET",
      &format!("/api/machines/{machine_id}/work-orders"),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["status"], "completed");
    assert_eq!(orders[0]["comment"], "oil changed");
  }

  // ── Item edits re-evaluate ──────────────────────────────────────────────

  #[tokio::test]
  async fn editing_replacement_date_retires_notification() {
    let state = make_state("secret", None).await;
    let auth = auth_header("operator", "secret");

    let (_, created) = oneshot_json(
      state.clone(),
      "POST",
      "/api/machines",
      Some(&auth),
      Some(machine_body(1005)),
    )
    .await;
    let item_id =
      created["items"][0]["item_id"].as_str().unwrap().to_string();

    oneshot_json(state.clone(), "GET", "/cron/sweep", None, None).await;
    let (_, notifications) = oneshot_json(
      state.clone(),
      "GET",
      "/api/notifications",
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    // Record the replacement directly on the item.
    let (status, _) = oneshot_json(
      state.clone(),
      "PUT",
      &format!("/api/items/{item_id}"),
      Some(&auth),
      Some(json!({ "last_replaced_at": Utc::now().to_rfc3339() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The stale alert retired without waiting for the next sweep.
    let (_, notifications) = oneshot_json(
      state,
      "GET",
      "/api/notifications",
      Some(&auth),
      None,
    )
    .await;
    assert!(notifications.as_array().unwrap().is_empty());
  }
}
