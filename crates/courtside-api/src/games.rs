//! Handlers for `/games` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/games` | Optional `season_id`, `team_id`, `status`, `date_from`, `date_to`, `limit`, `offset` |
//! | `POST` | `/games` | Body: [`CreateBody`]; enrolls both teams in the season |
//! | `GET`  | `/games/:id` | 404 if not found |
//! | `PUT`  | `/games/:id` | Body: [`GamePatch`]; date, location and notes only |
//! | `DELETE` | `/games/:id` | 409 once final or while it has stat lines |
//! | `GET`  | `/games/:id/stats` | Box scores for the game |
//! | `POST` | `/games/:id/final` | Body: `{"home_score":n,"away_score":n}`; 409 if already final |
//! | `POST` | `/games/:id/status` | Body: `{"status":"postponed"}`; non-final transitions only |
//!
//! Finalizing is the only path into result ingestion. The store claims the
//! game first ([`LeagueStore::finalize_game`] refuses a game that is already
//! final), then the engine folds the result into the aggregates. If
//! ingestion fails the claim is reverted so the request can be retried.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use courtside_core::{
  StandingsEngine,
  game::{Game, GamePatch, GameStatus, NewGame},
  ingest::GameTally,
  stats::{StatLineEntry, StatQuery},
  store::{GameQuery, LeagueStore},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

async fn load<S: LeagueStore>(engine: &StandingsEngine<S>, id: Uuid) -> Result<Game, ApiError> {
  engine
    .store()
    .get_game(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("game {id} not found")))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub season_id: Option<Uuid>,
  pub team_id:   Option<Uuid>,
  pub status:    Option<GameStatus>,
  pub date_from: Option<NaiveDate>,
  pub date_to:   Option<NaiveDate>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

impl From<ListParams> for GameQuery {
  fn from(p: ListParams) -> Self {
    GameQuery {
      season_id: p.season_id,
      team_id:   p.team_id,
      status:    p.status,
      date_from: p.date_from,
      date_to:   p.date_to,
      limit:     p.limit,
      offset:    p.offset,
    }
  }
}

/// `GET /games[?season_id=..][&team_id=..][&status=..][&date_from=..][&date_to=..]`
pub async fn list<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Game>>, ApiError> {
  let query = GameQuery::from(params);
  let games = engine.store().list_games(&query).await.map_err(ApiError::store)?;
  Ok(Json(games))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub season_id:    Uuid,
  pub home_team_id: Uuid,
  pub away_team_id: Uuid,
  pub played_on:    NaiveDate,
  #[serde(default)]
  pub location:     Option<String>,
  #[serde(default)]
  pub notes:        Option<String>,
}

/// `POST /games`
///
/// The store enrolls both teams in the season along with the game, so they
/// show up in the standings before it is played.
pub async fn create<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.home_team_id == body.away_team_id {
    return Err(ApiError::BadRequest("home and away team must differ".into()));
  }
  let game = engine
    .store()
    .add_game(NewGame {
      season_id:    body.season_id,
      home_team_id: body.home_team_id,
      away_team_id: body.away_team_id,
      played_on:    body.played_on,
      location:     body.location,
      notes:        body.notes,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(game)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /games/:id`
pub async fn get_one<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Game>, ApiError> {
  Ok(Json(load(&engine, id).await?))
}

// ─── Update / delete ─────────────────────────────────────────────────────────

/// `PUT /games/:id`
pub async fn update<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<GamePatch>,
) -> Result<Json<Game>, ApiError> {
  let game = load(&engine, id).await?.patched(body);
  let game = engine.store().update_game(game).await.map_err(ApiError::store)?;
  Ok(Json(game))
}

/// `DELETE /games/:id`
pub async fn delete<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.store().delete_game(id).await.map_err(ApiError::store)?;
  info!(game_id = %id, "game deleted");
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /games/:id/stats`
pub async fn stats<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatLineEntry>>, ApiError> {
  load(&engine, id).await?;
  let query = StatQuery { game_id: Some(id), ..Default::default() };
  let lines = engine.store().list_stat_lines(&query).await.map_err(ApiError::store)?;
  Ok(Json(lines.into_iter().map(StatLineEntry::from).collect()))
}

// ─── Finalize ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FinalBody {
  pub home_score: u32,
  pub away_score: u32,
}

/// The finalized game and the aggregate rows it produced.
#[derive(Debug, Serialize, Deserialize)]
pub struct Finalized {
  pub game:  Game,
  pub tally: GameTally,
}

/// `POST /games/:id/final`
pub async fn finalize<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<FinalBody>,
) -> Result<Json<Finalized>, ApiError> {
  let previous = load(&engine, id).await?;
  if previous.status.is_final() {
    return Err(ApiError::Conflict(format!("game {id} is already final")));
  }

  // Reject bad scores before claiming anything.
  let mut candidate = previous.clone();
  candidate.home_score = Some(body.home_score);
  candidate.away_score = Some(body.away_score);
  candidate.status = GameStatus::Final;
  candidate
    .result()
    .decide()
    .map_err(|reason| ApiError::BadRequest(format!("game {id}: {reason}")))?;

  let store = engine.store();
  let Some(game) = store
    .finalize_game(id, body.home_score, body.away_score)
    .await
    .map_err(ApiError::store)?
  else {
    return Err(ApiError::Conflict(format!("game {id} is already final")));
  };

  match engine.apply_finalized_game(&game.result()).await {
    Ok(tally) => {
      info!(game_id = %id, home = body.home_score, away = body.away_score, "game finalized");
      Ok(Json(Finalized { game, tally }))
    }
    Err(err) => {
      warn!(game_id = %id, "ingestion failed, reverting claim: {err}");
      if let Err(revert) = store.update_game(previous).await {
        error!(game_id = %id, "revert failed, game is final but not counted: {revert}");
        return Err(ApiError::Internal(format!(
          "game {id} was marked final but could not be counted: {err}"
        )));
      }
      Err(err.into())
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: GameStatus,
}

/// `POST /games/:id/status`
///
/// Final is reachable only through `/final`, and a final game keeps its
/// status: its result is already part of the aggregates.
pub async fn set_status<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Game>, ApiError> {
  if body.status.is_final() {
    return Err(ApiError::BadRequest(format!("use /games/{id}/final to record a result")));
  }
  let mut game = load(&engine, id).await?;
  if game.status.is_final() {
    return Err(ApiError::Conflict(format!("game {id} is final")));
  }
  game.status = body.status;
  let game = engine.store().update_game(game).await.map_err(ApiError::store)?;
  Ok(Json(game))
}
