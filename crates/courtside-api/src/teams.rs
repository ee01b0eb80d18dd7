//! Handlers for `/teams` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/teams` | Optional `?name=` substring filter |
//! | `POST` | `/teams` | Body: `{"name":"...","logo":"..."}` |
//! | `GET`  | `/teams/:id` | 404 if not found |
//! | `PUT`  | `/teams/:id` | Body: [`TeamPatch`]; absent fields are kept |
//! | `DELETE` | `/teams/:id` | 409 while the team has players or games |
//! | `GET`  | `/teams/:id/players` | The team's roster, by name |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use courtside_core::{
  StandingsEngine,
  league::{NewTeam, Team, TeamPatch},
  roster::{Player, PlayerQuery},
  store::LeagueStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub name: Option<String>,
}

/// `GET /teams[?name=<substring>]`
pub async fn list<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Team>>, ApiError> {
  let teams = engine
    .store()
    .list_teams(params.name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(teams))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /teams`
pub async fn create<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Json(body): Json<NewTeam>,
) -> Result<impl IntoResponse, ApiError> {
  let team = engine.store().add_team(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(team)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /teams/:id`
pub async fn get_one<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Team>, ApiError> {
  let team = engine
    .store()
    .get_team(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("team {id} not found")))?;
  Ok(Json(team))
}

// ─── Update / delete ─────────────────────────────────────────────────────────

/// `PUT /teams/:id`
pub async fn update<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TeamPatch>,
) -> Result<Json<Team>, ApiError> {
  let team = engine.store().update_team(id, body).await.map_err(ApiError::store)?;
  Ok(Json(team))
}

/// `DELETE /teams/:id`
pub async fn delete<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.store().delete_team(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// `GET /teams/:id/players`
pub async fn players<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Player>>, ApiError> {
  let store = engine.store();
  if store.get_team(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound(format!("team {id} not found")));
  }
  let query = PlayerQuery { team_id: Some(id), ..Default::default() };
  let players = store.list_players(&query).await.map_err(ApiError::store)?;
  Ok(Json(players))
}
