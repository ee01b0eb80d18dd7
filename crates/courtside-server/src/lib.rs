//! HTTP server for Courtside.
//!
//! Mounts the JSON API from `courtside-api` under `/api`, puts the
//! league-manager auth guard in front of every write, and traces requests.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware};
use courtside_core::{RetryPolicy, StandingsEngine, store::LeagueStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_manager};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `COURTSIDE_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  #[serde(default)]
  pub ingest:             IngestConfig,
}

/// Backoff for ingestion that loses an optimistic version check.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
  pub max_attempts: usize,
  pub min_delay_ms: u64,
  pub max_delay_ms: u64,
}

impl Default for IngestConfig {
  fn default() -> Self {
    let policy = RetryPolicy::default();
    Self {
      max_attempts: policy.max_attempts,
      min_delay_ms: policy.min_delay.as_millis() as u64,
      max_delay_ms: policy.max_delay.as_millis() as u64,
    }
  }
}

impl From<IngestConfig> for RetryPolicy {
  fn from(cfg: IngestConfig) -> Self {
    RetryPolicy {
      max_attempts: cfg.max_attempts.max(1),
      min_delay:    Duration::from_millis(cfg.min_delay_ms),
      max_delay:    Duration::from_millis(cfg.max_delay_ms.max(cfg.min_delay_ms)),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<S> {
  pub engine: Arc<StandingsEngine<S>>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { engine: Arc::clone(&self.engine), auth: Arc::clone(&self.auth) }
  }
}

impl<S: LeagueStore> AppState<S> {
  pub fn new(store: S, config: &ServerConfig) -> Self {
    let engine = StandingsEngine::new(Arc::new(store)).with_retry(config.ingest.into());
    Self {
      engine: Arc::new(engine),
      auth:   Arc::new(AuthConfig {
        username:      config.auth_username.clone(),
        password_hash: config.auth_password_hash.clone(),
      }),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the top-level axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LeagueStore + 'static,
{
  let api = courtside_api::api_router(state.engine)
    .layer(middleware::from_fn_with_state(state.auth, require_manager));

  Router::new()
    .nest("/api", api)
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
  use courtside_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  async fn make_app(password: &str) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    let config = ServerConfig {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from(":memory:"),
      auth_username:      "manager".to_string(),
      auth_password_hash: hash,
      ingest:             IngestConfig::default(),
    };
    router(AppState::new(store, &config))
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    app:    &Router,
    method: &str,
    uri:    &str,
    auth:   Option<&str>,
    body:   &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(a) = auth {
      builder = builder.header(header::AUTHORIZATION, a);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn reads_are_public() {
    let app  = make_app("secret").await;
    let resp = oneshot_raw(&app, "GET", "/api/teams", None, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn write_without_credentials_is_401_with_challenge() {
    let app  = make_app("secret").await;
    let resp = oneshot_raw(&app, "POST", "/api/teams", None, r#"{"name":"A"}"#).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));
  }

  #[tokio::test]
  async fn edits_and_deletes_need_credentials() {
    let app  = make_app("secret").await;
    let uri  = format!("/api/teams/{}", uuid::Uuid::new_v4());
    let resp = oneshot_raw(&app, "DELETE", &uri, None, "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = oneshot_raw(&app, "PUT", &uri, None, r#"{"name":"B"}"#).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let auth = auth_header("manager", "secret");
    let resp = oneshot_raw(&app, "DELETE", &uri, Some(&auth), "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn write_with_wrong_password_is_401() {
    let app  = make_app("secret").await;
    let auth = auth_header("manager", "guess");
    let resp = oneshot_raw(&app, "POST", "/api/teams", Some(&auth), r#"{"name":"A"}"#).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn manager_can_write_and_everyone_can_read_it_back() {
    let app  = make_app("secret").await;
    let auth = auth_header("manager", "secret");
    let resp = oneshot_raw(&app, "POST", "/api/teams", Some(&auth), r#"{"name":"A"}"#).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp  = oneshot_raw(&app, "GET", "/api/teams", None, "").await;
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let teams: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(teams[0]["name"], "A");
  }

  #[tokio::test]
  async fn unknown_route_is_404() {
    let app  = make_app("secret").await;
    let resp = oneshot_raw(&app, "GET", &format!("/api/nope/{}", uuid::Uuid::new_v4()), None, "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn ingest_config_clamps_into_a_usable_policy() {
    let policy = RetryPolicy::from(IngestConfig { max_attempts: 0, min_delay_ms: 50, max_delay_ms: 10 });
    assert_eq!(policy.max_attempts, 1);
    assert_eq!(policy.max_delay, Duration::from_millis(50));
  }
}
