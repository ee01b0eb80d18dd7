//! Handlers for `/seasons` endpoints, including the derived standings.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/seasons` | Optional `?active=true\|false` |
//! | `POST` | `/seasons` | Body: [`NewSeason`] |
//! | `GET`  | `/seasons/:id` | 404 if not found |
//! | `PUT`  | `/seasons/:id` | Body: [`SeasonPatch`]; dates are checked after merging |
//! | `DELETE` | `/seasons/:id` | 409 while the season has games |
//! | `GET`  | `/seasons/:id/standings` | Ranked table, best first |
//! | `GET`  | `/seasons/:id/head-to-head/:team/:opponent` | Zero record if the teams have not met; never writes |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use courtside_core::{
  StandingsEngine,
  league::{NewSeason, Season, SeasonPatch},
  record::HeadToHeadRecord,
  standings::StandingsEntry,
  store::LeagueStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub active: Option<bool>,
}

/// `GET /seasons[?active=<bool>]`
pub async fn list<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Season>>, ApiError> {
  let seasons = engine
    .store()
    .list_seasons(params.active)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(seasons))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /seasons`
pub async fn create<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Json(body): Json<NewSeason>,
) -> Result<impl IntoResponse, ApiError> {
  if !body.has_valid_dates() {
    return Err(ApiError::BadRequest("end_date must be after start_date".into()));
  }
  let season = engine.store().add_season(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(season)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /seasons/:id`
pub async fn get_one<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Season>, ApiError> {
  let season = engine
    .store()
    .get_season(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("season {id} not found")))?;
  Ok(Json(season))
}

// ─── Update / delete ─────────────────────────────────────────────────────────

/// `PUT /seasons/:id`
pub async fn update<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SeasonPatch>,
) -> Result<Json<Season>, ApiError> {
  let season = engine.store().update_season(id, body).await.map_err(ApiError::store)?;
  Ok(Json(season))
}

/// `DELETE /seasons/:id`
pub async fn delete<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.store().delete_season(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Standings ───────────────────────────────────────────────────────────────

/// `GET /seasons/:id/standings`
pub async fn standings<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<StandingsEntry>>, ApiError> {
  Ok(Json(engine.rank_standings(id).await?))
}

/// `GET /seasons/:id/head-to-head/:team/:opponent`
pub async fn head_to_head<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path((id, team, opponent)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<HeadToHeadRecord>, ApiError> {
  if team == opponent {
    return Err(ApiError::BadRequest("a team has no record against itself".into()));
  }
  let store = engine.store();
  if store.get_season(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound(format!("season {id} not found")));
  }
  for team_id in [team, opponent] {
    if store.get_team(team_id).await.map_err(ApiError::store)?.is_none() {
      return Err(ApiError::NotFound(format!("team {team_id} not found")));
    }
  }
  Ok(Json(engine.head_to_head(id, team, opponent).await?))
}
