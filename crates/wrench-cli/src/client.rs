//! Async HTTP client wrapping the wrench JSON API.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::time::Duration;
use wrench_core::{machine::Machine, notify::Notification};

/// Connection settings for the wrench API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the wrench JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// `GET /api/machines`
  pub async fn list_machines(&self) -> Result<Vec<Machine>> {
    let resp = self
      .auth(self.client.get(self.url("/machines")))
      .send()
      .await
      .context("GET /machines failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /machines → {}", resp.status()));
    }
    resp.json().await.context("deserialising machines")
  }

  /// `GET /api/notifications`
  pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
    let resp = self
      .auth(self.client.get(self.url("/notifications")))
      .send()
      .await
      .context("GET /notifications failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /notifications → {}", resp.status()));
    }
    resp.json().await.context("deserialising notifications")
  }

  /// `GET /cron/sweep[?secret=...]` — the trigger sits outside `/api`.
  pub async fn run_sweep(
    &self,
    secret: Option<&str>,
  ) -> Result<serde_json::Value> {
    let url = format!(
      "{}/cron/sweep",
      self.config.base_url.trim_end_matches('/')
    );
    let mut req = self.client.get(url);
    if let Some(secret) = secret {
      req = req.query(&[("secret", secret)]);
    }
    let resp = req.send().await.context("GET /cron/sweep failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /cron/sweep → {}", resp.status()));
    }
    resp.json().await.context("deserialising sweep summary")
  }
}
