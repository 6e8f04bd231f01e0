//! HTTP Basic-auth verification for the `/api` surface.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use std::sync::Arc;

use crate::error::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Verify credentials directly from headers.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(())
}

/// Middleware guarding the nested `/api` router.
pub async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  match verify_auth(req.headers(), &auth) {
    Ok(()) => next.run(req).await,
    Err(e) => e.into_response(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::http::header;
  use rand_core::OsRng;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig {
      username:      "operator".to_string(),
      password_hash: hash,
    }
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let encoded = B64.encode(format!("{user}:{pass}"));
    headers.insert(
      header::AUTHORIZATION,
      format!("Basic {encoded}").parse().unwrap(),
    );
    headers
  }

  #[test]
  fn correct_credentials() {
    let cfg = config("secret");
    assert!(verify_auth(&basic("operator", "secret"), &cfg).is_ok());
  }

  #[test]
  fn wrong_password() {
    let cfg = config("secret");
    let result = verify_auth(&basic("operator", "wrong"), &cfg);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn wrong_username() {
    let cfg = config("secret");
    let result = verify_auth(&basic("intruder", "secret"), &cfg);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let cfg = config("secret");
    let result = verify_auth(&HeaderMap::new(), &cfg);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let cfg = config("secret");
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      "Basic !!!not-base64!!!".parse().unwrap(),
    );
    let result = verify_auth(&headers, &cfg);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }
}
