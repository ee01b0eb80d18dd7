//! Player stat lines: one box-score row per player per game.
//!
//! Only counting stats are stored. Field-goal totals, shooting percentages
//! and fantasy points are derived on read by [`StatLineEntry`], so they can
//! never disagree with the counts they come from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidStatLine;

// ─── Box score ───────────────────────────────────────────────────────────────

/// The counting stats of one player in one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxScore {
  pub minutes_played:     Option<u32>,
  pub points:             u32,
  pub rebounds:           u32,
  pub assists:            u32,
  pub steals:             u32,
  pub blocks:             u32,
  pub two_pt_made:        u32,
  pub two_pt_attempted:   u32,
  pub three_pt_made:      u32,
  pub three_pt_attempted: u32,
  pub ft_made:            u32,
  pub ft_attempted:       u32,
  pub turnovers:          u32,
  pub fouls:              u32,
  /// Did not play.
  pub dnp:                bool,
}

/// Fantasy scoring, in hundredths of a point per unit.
const FANTASY_POINT: i64 = 100;
const FANTASY_REBOUND: i64 = 120;
const FANTASY_ASSIST: i64 = 150;
const FANTASY_STEAL: i64 = 200;
const FANTASY_BLOCK: i64 = 200;
const FANTASY_TURNOVER: i64 = -100;

impl BoxScore {
  /// Points implied by made shots.
  pub fn points_from_shots(&self) -> u32 {
    self.two_pt_made * 2 + self.three_pt_made * 3 + self.ft_made
  }

  /// Fill in `points` from made shots when none were entered.
  #[must_use]
  pub fn with_derived_points(self) -> Self {
    if self.points == 0 {
      Self { points: self.points_from_shots(), ..self }
    } else {
      self
    }
  }

  pub fn fg_made(&self) -> u32 { self.two_pt_made + self.three_pt_made }

  pub fn fg_attempted(&self) -> u32 { self.two_pt_attempted + self.three_pt_attempted }

  /// Exact fantasy score in hundredths of a point.
  pub fn fantasy_hundredths(&self) -> i64 {
    i64::from(self.points) * FANTASY_POINT
      + i64::from(self.rebounds) * FANTASY_REBOUND
      + i64::from(self.assists) * FANTASY_ASSIST
      + i64::from(self.steals) * FANTASY_STEAL
      + i64::from(self.blocks) * FANTASY_BLOCK
      + i64::from(self.turnovers) * FANTASY_TURNOVER
  }

  /// Refuse shooting lines with more makes than attempts.
  pub fn validate(&self) -> Result<(), InvalidStatLine> {
    let shots = [
      ("two_pt", self.two_pt_made, self.two_pt_attempted),
      ("three_pt", self.three_pt_made, self.three_pt_attempted),
      ("ft", self.ft_made, self.ft_attempted),
    ];
    for (shot, made, attempted) in shots {
      if made > attempted {
        return Err(InvalidStatLine::MadeExceedsAttempted { shot, made, attempted });
      }
    }
    Ok(())
  }
}

fn pct(made: u32, attempted: u32) -> f64 {
  if attempted == 0 { 0.0 } else { f64::from(made) / f64::from(attempted) }
}

// ─── Stored line ─────────────────────────────────────────────────────────────

/// A player's box score for one game. At most one per `(game_id, player_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
  pub stat_line_id: Uuid,
  pub game_id:      Uuid,
  pub player_id:    Uuid,
  #[serde(flatten)]
  pub box_score:    BoxScore,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::LeagueStore::add_stat_line`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewStatLine {
  pub game_id:   Uuid,
  pub player_id: Uuid,
  #[serde(flatten)]
  pub box_score: BoxScore,
}

/// Changes to a stat line. Absent fields are left as they are.
///
/// When a made-shot count changes and `points` is not given, points are
/// recomputed from the merged shooting line.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct StatLinePatch {
  pub minutes_played:     Option<u32>,
  pub points:             Option<u32>,
  pub rebounds:           Option<u32>,
  pub assists:            Option<u32>,
  pub steals:             Option<u32>,
  pub blocks:             Option<u32>,
  pub two_pt_made:        Option<u32>,
  pub two_pt_attempted:   Option<u32>,
  pub three_pt_made:      Option<u32>,
  pub three_pt_attempted: Option<u32>,
  pub ft_made:            Option<u32>,
  pub ft_attempted:       Option<u32>,
  pub turnovers:          Option<u32>,
  pub fouls:              Option<u32>,
  pub dnp:                Option<bool>,
}

impl StatLinePatch {
  fn changes_makes(&self) -> bool {
    self.two_pt_made.is_some() || self.three_pt_made.is_some() || self.ft_made.is_some()
  }
}

impl BoxScore {
  #[must_use]
  pub fn patched(self, p: StatLinePatch) -> Self {
    let merged = Self {
      minutes_played:     p.minutes_played.or(self.minutes_played),
      points:             p.points.unwrap_or(self.points),
      rebounds:           p.rebounds.unwrap_or(self.rebounds),
      assists:            p.assists.unwrap_or(self.assists),
      steals:             p.steals.unwrap_or(self.steals),
      blocks:             p.blocks.unwrap_or(self.blocks),
      two_pt_made:        p.two_pt_made.unwrap_or(self.two_pt_made),
      two_pt_attempted:   p.two_pt_attempted.unwrap_or(self.two_pt_attempted),
      three_pt_made:      p.three_pt_made.unwrap_or(self.three_pt_made),
      three_pt_attempted: p.three_pt_attempted.unwrap_or(self.three_pt_attempted),
      ft_made:            p.ft_made.unwrap_or(self.ft_made),
      ft_attempted:       p.ft_attempted.unwrap_or(self.ft_attempted),
      turnovers:          p.turnovers.unwrap_or(self.turnovers),
      fouls:              p.fouls.unwrap_or(self.fouls),
      dnp:                p.dnp.unwrap_or(self.dnp),
    };
    if p.changes_makes() && p.points.is_none() {
      Self { points: merged.points_from_shots(), ..merged }
    } else {
      merged
    }
  }
}

/// Parameters for [`crate::store::LeagueStore::list_stat_lines`].
#[derive(Debug, Clone, Default)]
pub struct StatQuery {
  pub game_id:   Option<Uuid>,
  pub player_id: Option<Uuid>,
  /// Lines from games in this season.
  pub season_id: Option<Uuid>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

// ─── Derived view ────────────────────────────────────────────────────────────

/// A stat line with its derived shooting and fantasy figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLineEntry {
  #[serde(flatten)]
  pub line:                StatLine,
  pub fantasy_points:      f64,
  pub fg_made:             u32,
  pub fg_attempted:        u32,
  pub fg_percentage:       f64,
  pub two_pt_percentage:   f64,
  pub three_pt_percentage: f64,
  pub ft_percentage:       f64,
}

impl From<StatLine> for StatLineEntry {
  fn from(line: StatLine) -> Self {
    let b = line.box_score;
    Self {
      fantasy_points:      b.fantasy_hundredths() as f64 / 100.0,
      fg_made:             b.fg_made(),
      fg_attempted:        b.fg_attempted(),
      fg_percentage:       pct(b.fg_made(), b.fg_attempted()),
      two_pt_percentage:   pct(b.two_pt_made, b.two_pt_attempted),
      three_pt_percentage: pct(b.three_pt_made, b.three_pt_attempted),
      ft_percentage:       pct(b.ft_made, b.ft_attempted),
      line,
    }
  }
}
