//! Aggregate rows: running season and head-to-head records.
//!
//! Records are plain values. Ingestion never mutates a stored record in
//! place; it derives a successor with [`TeamSeasonRecord::after_win`] and
//! friends and hands the new value to the store.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Win percentage ──────────────────────────────────────────────────────────

/// An exact winning percentage, `wins / games`.
///
/// Compared by cross-multiplication so that equal ratios (1-1 and 2-2) are
/// equal and no floating-point rounding enters grouping. A record with no
/// games counts as 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WinPct {
  pub wins:  u32,
  pub games: u32,
}

impl WinPct {
  pub fn new(wins: u32, games: u32) -> Self {
    debug_assert!(wins <= games, "{wins} wins in {games} games");
    Self { wins, games }
  }

  fn ratio(self) -> (u64, u64) {
    if self.games == 0 {
      (0, 1)
    } else {
      (u64::from(self.wins), u64::from(self.games))
    }
  }

  /// Lossy decimal form, for display only.
  pub fn as_f64(self) -> f64 {
    let (wins, games) = self.ratio();
    wins as f64 / games as f64
  }
}

impl PartialEq for WinPct {
  fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for WinPct {}

impl PartialOrd for WinPct {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for WinPct {
  fn cmp(&self, other: &Self) -> Ordering {
    let (a_wins, a_games) = self.ratio();
    let (b_wins, b_games) = other.ratio();
    (a_wins * b_games).cmp(&(b_wins * a_games))
  }
}

// ─── Team season ─────────────────────────────────────────────────────────────

/// A team's running record for one season. Keyed by `(team_id, season_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSeasonRecord {
  pub team_id:        Uuid,
  pub season_id:      Uuid,
  pub wins:           u32,
  pub losses:         u32,
  pub points_for:     u64,
  pub points_against: u64,
  /// Positive for a winning run, negative for a losing run, 0 before the
  /// first game.
  pub streak:         i32,
  /// Optimistic-concurrency token; the number of times the row was written.
  pub version:        u64,
}

impl TeamSeasonRecord {
  pub fn zeroed(team_id: Uuid, season_id: Uuid) -> Self {
    Self {
      team_id,
      season_id,
      wins: 0,
      losses: 0,
      points_for: 0,
      points_against: 0,
      streak: 0,
      version: 0,
    }
  }

  pub fn games(&self) -> u32 { self.wins + self.losses }

  pub fn win_pct(&self) -> WinPct { WinPct::new(self.wins, self.games()) }

  pub fn point_differential(&self) -> i64 {
    self.points_for as i64 - self.points_against as i64
  }

  /// The record after one more win scoring `scored` and allowing `allowed`.
  /// A win snaps a losing streak to +1 and extends a winning one.
  #[must_use]
  pub fn after_win(&self, scored: u32, allowed: u32) -> Self {
    Self {
      wins: self.wins + 1,
      streak: (self.streak + 1).max(1),
      ..self.with_points(scored, allowed)
    }
  }

  /// The record after one more loss. Mirrors [`Self::after_win`].
  #[must_use]
  pub fn after_loss(&self, scored: u32, allowed: u32) -> Self {
    Self {
      losses: self.losses + 1,
      streak: (self.streak - 1).min(-1),
      ..self.with_points(scored, allowed)
    }
  }

  fn with_points(&self, scored: u32, allowed: u32) -> Self {
    Self {
      points_for: self.points_for + u64::from(scored),
      points_against: self.points_against + u64::from(allowed),
      ..*self
    }
  }
}

// ─── Head to head ────────────────────────────────────────────────────────────

/// One direction of a pairing: `team_id`'s record against `opponent_id`.
///
/// Every meeting writes both directions, so `(A, B).wins == (B, A).losses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
  pub season_id:      Uuid,
  pub team_id:        Uuid,
  pub opponent_id:    Uuid,
  pub wins:           u32,
  pub losses:         u32,
  pub points_for:     u64,
  pub points_against: u64,
  pub version:        u64,
}

impl HeadToHeadRecord {
  pub fn zeroed(season_id: Uuid, team_id: Uuid, opponent_id: Uuid) -> Self {
    Self {
      season_id,
      team_id,
      opponent_id,
      wins: 0,
      losses: 0,
      points_for: 0,
      points_against: 0,
      version: 0,
    }
  }

  pub fn games(&self) -> u32 { self.wins + self.losses }

  #[must_use]
  pub fn after_win(&self, scored: u32, allowed: u32) -> Self {
    Self { wins: self.wins + 1, ..self.with_points(scored, allowed) }
  }

  #[must_use]
  pub fn after_loss(&self, scored: u32, allowed: u32) -> Self {
    Self { losses: self.losses + 1, ..self.with_points(scored, allowed) }
  }

  fn with_points(&self, scored: u32, allowed: u32) -> Self {
    Self {
      points_for: self.points_for + u64::from(scored),
      points_against: self.points_against + u64::from(allowed),
      ..*self
    }
  }
}
