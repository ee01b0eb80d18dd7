//! Handlers for `/players` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players` | Optional `name`, `team_id`, `limit`, `offset` |
//! | `POST` | `/players` | Body: [`NewPlayer`]; 404 if the team is unknown |
//! | `GET`  | `/players/:id` | 404 if not found |
//! | `PUT`  | `/players/:id` | Body: [`PlayerPatch`] |
//! | `DELETE` | `/players/:id` | 409 while the player has stat lines |
//! | `GET`  | `/players/:id/stats` | Optional `?season_id=` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use courtside_core::{
  StandingsEngine,
  roster::{NewPlayer, Player, PlayerPatch, PlayerQuery},
  stats::{StatLineEntry, StatQuery},
  store::LeagueStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

async fn load<S: LeagueStore>(engine: &StandingsEngine<S>, id: Uuid) -> Result<Player, ApiError> {
  engine
    .store()
    .get_player(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("player {id} not found")))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub name:    Option<String>,
  pub team_id: Option<Uuid>,
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
}

/// `GET /players[?name=..][&team_id=..]`
pub async fn list<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Query(p): Query<ListParams>,
) -> Result<Json<Vec<Player>>, ApiError> {
  let query = PlayerQuery { name: p.name, team_id: p.team_id, limit: p.limit, offset: p.offset };
  let players = engine.store().list_players(&query).await.map_err(ApiError::store)?;
  Ok(Json(players))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /players`
pub async fn create<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Json(body): Json<NewPlayer>,
) -> Result<impl IntoResponse, ApiError> {
  let player = engine.store().add_player(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(player)))
}

// ─── Get / update / delete ───────────────────────────────────────────────────

/// `GET /players/:id`
pub async fn get_one<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Player>, ApiError> {
  Ok(Json(load(&engine, id).await?))
}

/// `PUT /players/:id`
pub async fn update<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PlayerPatch>,
) -> Result<Json<Player>, ApiError> {
  let player = engine.store().update_player(id, body).await.map_err(ApiError::store)?;
  Ok(Json(player))
}

/// `DELETE /players/:id`
pub async fn delete<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.store().delete_player(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
  pub season_id: Option<Uuid>,
}

/// `GET /players/:id/stats[?season_id=..]`
pub async fn stats<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Query(p): Query<StatsParams>,
) -> Result<Json<Vec<StatLineEntry>>, ApiError> {
  load(&engine, id).await?;
  let query = StatQuery { player_id: Some(id), season_id: p.season_id, ..Default::default() };
  let lines = engine.store().list_stat_lines(&query).await.map_err(ApiError::store)?;
  Ok(Json(lines.into_iter().map(StatLineEntry::from).collect()))
}
