//! Result ingestion: turning one finalized game into four new aggregate rows.
//!
//! [`tally`] is pure: given the current snapshots of the four rows a game
//! touches, it returns their successors. Persisting them atomically is the
//! store's job ([`crate::store::AggregateStore::commit_tally`]); serialising
//! the read-modify-write is the engine's.

use serde::{Deserialize, Serialize};

use crate::{
  game::{FinalScore, GameResult, Side},
  record::{HeadToHeadRecord, TeamSeasonRecord},
};

/// The four rows a single game touches, before or after ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTally {
  pub home:         TeamSeasonRecord,
  pub away:         TeamSeasonRecord,
  /// Home team's record against the away team.
  pub home_vs_away: HeadToHeadRecord,
  /// Away team's record against the home team.
  pub away_vs_home: HeadToHeadRecord,
}

impl GameTally {
  /// Whether these snapshots are exactly the rows `game` should touch.
  pub fn matches(&self, game: &GameResult) -> bool {
    let season = game.season_id;
    let (home, away) = (game.home_team_id, game.away_team_id);
    self.home.team_id == home
      && self.home.season_id == season
      && self.away.team_id == away
      && self.away.season_id == season
      && (self.home_vs_away.season_id, self.home_vs_away.team_id, self.home_vs_away.opponent_id)
        == (season, home, away)
      && (self.away_vs_home.season_id, self.away_vs_home.team_id, self.away_vs_home.opponent_id)
        == (season, away, home)
  }
}

/// Apply a decided score to the current snapshots.
///
/// Versions are carried through unchanged; the store bumps them on commit.
pub fn tally(score: FinalScore, current: GameTally) -> GameTally {
  let FinalScore { home: home_pts, away: away_pts, winner } = score;
  let GameTally { home, away, home_vs_away, away_vs_home } = current;

  match winner {
    Side::Home => GameTally {
      home:         home.after_win(home_pts, away_pts),
      away:         away.after_loss(away_pts, home_pts),
      home_vs_away: home_vs_away.after_win(home_pts, away_pts),
      away_vs_home: away_vs_home.after_loss(away_pts, home_pts),
    },
    Side::Away => GameTally {
      home:         home.after_loss(home_pts, away_pts),
      away:         away.after_win(away_pts, home_pts),
      home_vs_away: home_vs_away.after_loss(home_pts, away_pts),
      away_vs_home: away_vs_home.after_win(away_pts, home_pts),
    },
  }
}
