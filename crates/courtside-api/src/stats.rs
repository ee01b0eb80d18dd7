//! Handlers for `/stats` endpoints: player box scores.
//!
//! Every response carries the derived shooting percentages and fantasy
//! points alongside the stored counts (see [`StatLineEntry`]).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/stats` | Optional `game_id`, `player_id`, `season_id`, `limit`, `offset` |
//! | `POST` | `/stats` | Body: [`NewStatLine`]; 409 if the player already has a line for the game |
//! | `GET`  | `/stats/:id` | 404 if not found |
//! | `PUT`  | `/stats/:id` | Body: [`StatLinePatch`] |
//! | `DELETE` | `/stats/:id` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use courtside_core::{
  StandingsEngine,
  stats::{NewStatLine, StatLineEntry, StatLinePatch, StatQuery},
  store::LeagueStore,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub game_id:   Option<Uuid>,
  pub player_id: Option<Uuid>,
  pub season_id: Option<Uuid>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

impl From<ListParams> for StatQuery {
  fn from(p: ListParams) -> Self {
    StatQuery {
      game_id:   p.game_id,
      player_id: p.player_id,
      season_id: p.season_id,
      limit:     p.limit,
      offset:    p.offset,
    }
  }
}

/// `GET /stats`
pub async fn list<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<StatLineEntry>>, ApiError> {
  let query = StatQuery::from(params);
  let lines = engine.store().list_stat_lines(&query).await.map_err(ApiError::store)?;
  Ok(Json(lines.into_iter().map(StatLineEntry::from).collect()))
}

/// `POST /stats`
pub async fn create<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Json(body): Json<NewStatLine>,
) -> Result<impl IntoResponse, ApiError> {
  let line = engine.store().add_stat_line(body).await.map_err(ApiError::store)?;
  debug!(game_id = %line.game_id, player_id = %line.player_id, "stat line recorded");
  Ok((StatusCode::CREATED, Json(StatLineEntry::from(line))))
}

/// `GET /stats/:id`
pub async fn get_one<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StatLineEntry>, ApiError> {
  let line = engine
    .store()
    .get_stat_line(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("stat line {id} not found")))?;
  Ok(Json(line.into()))
}

/// `PUT /stats/:id`
pub async fn update<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatLinePatch>,
) -> Result<Json<StatLineEntry>, ApiError> {
  let line = engine.store().update_stat_line(id, body).await.map_err(ApiError::store)?;
  Ok(Json(line.into()))
}

/// `DELETE /stats/:id`
pub async fn delete<S: LeagueStore>(
  State(engine): State<Arc<StandingsEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.store().delete_stat_line(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
