//! Error type for `courtside-store-sqlite`.

use courtside_core::store::{FailureKind, StoreFailure};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored value could not be mapped back to a domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("team not found: {0}")]
  TeamNotFound(Uuid),

  #[error("season not found: {0}")]
  SeasonNotFound(Uuid),

  #[error("game not found: {0}")]
  GameNotFound(Uuid),

  #[error("player not found: {0}")]
  PlayerNotFound(Uuid),

  #[error("stat line not found: {0}")]
  StatLineNotFound(Uuid),

  /// An optimistic write found a different version than it expected.
  #[error("stale {table} row: expected version {expected}")]
  StaleVersion { table: &'static str, expected: u64 },

  #[error("name already taken: {0:?}")]
  DuplicateName(String),

  #[error("player {player_id} already has a stat line for game {game_id}")]
  DuplicateStatLine { game_id: Uuid, player_id: Uuid },

  /// A delete refused because other rows still refer to the target.
  #[error("cannot delete {what} {id}: {reason}")]
  InUse { what: &'static str, id: Uuid, reason: &'static str },

  #[error("{0}")]
  Rejected(String),
}

impl StoreFailure for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Self::TeamNotFound(_)
      | Self::SeasonNotFound(_)
      | Self::GameNotFound(_)
      | Self::PlayerNotFound(_)
      | Self::StatLineNotFound(_) => FailureKind::NotFound,
      Self::StaleVersion { .. }
      | Self::DuplicateName(_)
      | Self::DuplicateStatLine { .. }
      | Self::InUse { .. } => FailureKind::Conflict,
      Self::Rejected(_) => FailureKind::Rejected,
      Self::Database(_) | Self::Uuid(_) | Self::Decode(_) => FailureKind::Unavailable,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
