//! Error types for `courtside-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::game::GameStatus;

/// Why a game was refused by result ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGame {
  #[error("game is {0}, not final")]
  NotFinal(GameStatus),

  #[error("final score is missing")]
  MissingScore,

  #[error("tied final score {0}-{0}")]
  TiedScore(u32),

  #[error("home and away team are the same team {0}")]
  SameTeam(Uuid),
}

/// Why a stat line was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStatLine {
  #[error("{shot}: {made} made of {attempted} attempted")]
  MadeExceedsAttempted { shot: &'static str, made: u32, attempted: u32 },
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid game {game_id}: {reason}")]
  InvalidInput { game_id: Uuid, reason: InvalidGame },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("concurrent ingestion conflict in season {season_id}")]
  ConcurrencyConflict { season_id: Uuid },

  #[error("rejected by store: {0}")]
  Rejected(String),

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_conflict(&self) -> bool {
    matches!(self, Self::ConcurrencyConflict { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
