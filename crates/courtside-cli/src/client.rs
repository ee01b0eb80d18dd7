//! Async HTTP client wrapping the Courtside JSON API.

use std::{collections::HashMap, time::Duration};

use anyhow::{Context, Result, anyhow};
use courtside_core::{
  ingest::GameTally,
  game::Game,
  league::Team,
  record::HeadToHeadRecord,
  standings::StandingsEntry,
};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

/// Connection settings for the Courtside API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Body of `POST /games/{id}/final`.
#[derive(Debug, Deserialize)]
pub struct Finalized {
  pub game:  Game,
  pub tally: GameTally,
}

/// Async HTTP client for the Courtside JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
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
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v["error"].as_str().map(str::to_owned))
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {message}"))
  }

  // ── Teams ─────────────────────────────────────────────────────────────────

  /// `GET /api/teams`, keyed by id.
  pub async fn team_names(&self) -> Result<HashMap<Uuid, String>> {
    let resp = self
      .auth(self.client.get(self.url("/teams")))
      .send()
      .await
      .context("GET /teams failed")?;
    let teams: Vec<Team> = Self::check(resp, "GET /teams")
      .await?
      .json()
      .await
      .context("deserialising teams")?;
    Ok(teams.into_iter().map(|t| (t.team_id, t.name)).collect())
  }

  // ── Seasons ───────────────────────────────────────────────────────────────

  /// `GET /api/seasons/{id}/standings`
  pub async fn standings(&self, season_id: Uuid) -> Result<Vec<StandingsEntry>> {
    let path = format!("/seasons/{season_id}/standings");
    debug!(%season_id, "fetching standings");
    let resp = self
      .auth(self.client.get(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::check(resp, &format!("GET {path}"))
      .await?
      .json()
      .await
      .context("deserialising standings")
  }

  /// `GET /api/seasons/{id}/head-to-head/{team}/{opponent}`
  pub async fn head_to_head(
    &self,
    season_id: Uuid,
    team_id: Uuid,
    opponent_id: Uuid,
  ) -> Result<HeadToHeadRecord> {
    let path = format!("/seasons/{season_id}/head-to-head/{team_id}/{opponent_id}");
    let resp = self
      .auth(self.client.get(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::check(resp, &format!("GET {path}"))
      .await?
      .json()
      .await
      .context("deserialising head-to-head record")
  }

  // ── Games ─────────────────────────────────────────────────────────────────

  /// `POST /api/games/{id}/final`
  pub async fn finalize(&self, game_id: Uuid, home_score: u32, away_score: u32) -> Result<Finalized> {
    let path = format!("/games/{game_id}/final");
    let resp = self
      .auth(self.client.post(self.url(&path)))
      .json(&json!({ "home_score": home_score, "away_score": away_score }))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::check(resp, &format!("POST {path}"))
      .await?
      .json()
      .await
      .context("deserialising finalized game")
  }
}
