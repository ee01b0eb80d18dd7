//! Games, both scheduled fixtures and the finalized results fed to ingestion.
//!
//! A [`Game`] is the league's mutable schedule entry. Once it reaches
//! [`GameStatus::Final`] it is projected into an immutable [`GameResult`],
//! which is the only thing the standings engine ever consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidGame;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a game.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
  #[default]
  Scheduled,
  InProgress,
  Final,
  Postponed,
  Cancelled,
}

impl GameStatus {
  pub fn is_final(self) -> bool { matches!(self, Self::Final) }
}

// ─── Schedule entry ──────────────────────────────────────────────────────────

/// A game on the league schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
  pub game_id:      Uuid,
  pub season_id:    Uuid,
  pub home_team_id: Uuid,
  pub away_team_id: Uuid,
  pub played_on:    NaiveDate,
  pub location:     Option<String>,
  pub home_score:   Option<u32>,
  pub away_score:   Option<u32>,
  pub status:       GameStatus,
  pub notes:        Option<String>,
}

impl Game {
  /// Project this game into the value consumed by result ingestion.
  pub fn result(&self) -> GameResult {
    GameResult {
      game_id:      self.game_id,
      season_id:    self.season_id,
      home_team_id: self.home_team_id,
      away_team_id: self.away_team_id,
      home_score:   self.home_score,
      away_score:   self.away_score,
      status:       self.status,
    }
  }
}

/// Input to [`crate::store::LeagueStore::add_game`].
/// `game_id` is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewGame {
  pub season_id:    Uuid,
  pub home_team_id: Uuid,
  pub away_team_id: Uuid,
  pub played_on:    NaiveDate,
  pub location:     Option<String>,
  pub notes:        Option<String>,
}

/// Schedule details that can change without touching the result.
///
/// Scores and status are not part of a patch: they move only through
/// finalization and status transitions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GamePatch {
  pub played_on: Option<NaiveDate>,
  pub location:  Option<String>,
  pub notes:     Option<String>,
}

impl Game {
  #[must_use]
  pub fn patched(self, patch: GamePatch) -> Self {
    Self {
      played_on: patch.played_on.unwrap_or(self.played_on),
      location: patch.location.or(self.location),
      notes: patch.notes.or(self.notes),
      ..self
    }
  }
}

// ─── Finalized result ────────────────────────────────────────────────────────

/// One game's outcome as handed to ingestion. Immutable once final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
  pub game_id:      Uuid,
  pub season_id:    Uuid,
  pub home_team_id: Uuid,
  pub away_team_id: Uuid,
  pub home_score:   Option<u32>,
  pub away_score:   Option<u32>,
  pub status:       GameStatus,
}

/// Which side of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Home,
  Away,
}

/// A validated final score with a strict winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
  pub home:   u32,
  pub away:   u32,
  pub winner: Side,
}

impl GameResult {
  /// Convenience constructor for a finished game.
  pub fn final_score(
    game_id: Uuid,
    season_id: Uuid,
    home_team_id: Uuid,
    away_team_id: Uuid,
    home_score: u32,
    away_score: u32,
  ) -> Self {
    Self {
      game_id,
      season_id,
      home_team_id,
      away_team_id,
      home_score: Some(home_score),
      away_score: Some(away_score),
      status: GameStatus::Final,
    }
  }

  /// Check the ingestion preconditions and extract the decided score.
  ///
  /// Tied scores are refused rather than credited to either side.
  pub fn decide(&self) -> Result<FinalScore, InvalidGame> {
    if !self.status.is_final() {
      return Err(InvalidGame::NotFinal(self.status));
    }
    if self.home_team_id == self.away_team_id {
      return Err(InvalidGame::SameTeam(self.home_team_id));
    }
    let (Some(home), Some(away)) = (self.home_score, self.away_score) else {
      return Err(InvalidGame::MissingScore);
    };
    let winner = match home.cmp(&away) {
      std::cmp::Ordering::Greater => Side::Home,
      std::cmp::Ordering::Less => Side::Away,
      std::cmp::Ordering::Equal => return Err(InvalidGame::TiedScore(home)),
    };
    Ok(FinalScore { home, away, winner })
  }
}
