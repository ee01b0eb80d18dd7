//! Tiebreak resolver for a group of teams with identical win percentage.
//!
//! The cascade is a fixed list of [`Tiebreaker`]s. Each one only separates
//! teams the earlier ones left level, and teams level on every criterion keep
//! their input order (the sort is stable).

use std::{cmp::Ordering, collections::HashMap};

use uuid::Uuid;

use crate::record::{HeadToHeadRecord, TeamSeasonRecord, WinPct};

// ─── Head-to-head lookup ─────────────────────────────────────────────────────

/// Head-to-head rows for one season, keyed by `(team_id, opponent_id)`.
#[derive(Debug, Clone, Default)]
pub struct HeadToHeadTable {
  rows: HashMap<(Uuid, Uuid), HeadToHeadRecord>,
}

impl HeadToHeadTable {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, row: HeadToHeadRecord) {
    self.rows.insert((row.team_id, row.opponent_id), row);
  }

  pub fn get(&self, team_id: Uuid, opponent_id: Uuid) -> Option<&HeadToHeadRecord> {
    self.rows.get(&(team_id, opponent_id))
  }

  /// `team_id`'s combined record against the members of `group`.
  /// A team that has not met any of them scores 0.
  pub fn mini_win_pct(&self, team_id: Uuid, group: &[Uuid]) -> WinPct {
    let (wins, games) = group
      .iter()
      .filter(|&&opponent| opponent != team_id)
      .filter_map(|&opponent| self.get(team_id, opponent))
      .fold((0, 0), |(wins, games), row| (wins + row.wins, games + row.games()));
    WinPct::new(wins, games)
  }
}

impl FromIterator<HeadToHeadRecord> for HeadToHeadTable {
  fn from_iter<I: IntoIterator<Item = HeadToHeadRecord>>(iter: I) -> Self {
    let mut table = Self::new();
    for row in iter {
      table.insert(row);
    }
    table
  }
}

// ─── Cascade ─────────────────────────────────────────────────────────────────

/// One rung of the tiebreak cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tiebreaker {
  /// Win percentage in games among the tied teams, higher first.
  HeadToHead,
  /// Season points allowed, fewer first.
  FewestPointsAllowed,
  /// Season points scored, more first.
  MostPointsScored,
}

/// The order tiebreakers are applied in.
pub const CASCADE: [Tiebreaker; 3] = [
  Tiebreaker::HeadToHead,
  Tiebreaker::FewestPointsAllowed,
  Tiebreaker::MostPointsScored,
];

/// A group member with its head-to-head metric precomputed.
struct Candidate {
  record:   TeamSeasonRecord,
  mini_pct: WinPct,
}

impl Tiebreaker {
  fn compare(self, a: &Candidate, b: &Candidate) -> Ordering {
    match self {
      Self::HeadToHead => b.mini_pct.cmp(&a.mini_pct),
      Self::FewestPointsAllowed => a.record.points_against.cmp(&b.record.points_against),
      Self::MostPointsScored => b.record.points_for.cmp(&a.record.points_for),
    }
  }
}

/// Order a tied group.
///
/// The head-to-head metric is taken over the whole group passed in. Callers
/// supply a table holding at least every head-to-head row among the group's
/// members for the season being ranked.
pub fn resolve(group: Vec<TeamSeasonRecord>, h2h: &HeadToHeadTable) -> Vec<TeamSeasonRecord> {
  if group.len() < 2 {
    return group;
  }

  let members: Vec<Uuid> = group.iter().map(|r| r.team_id).collect();
  let mut candidates: Vec<Candidate> = group
    .into_iter()
    .map(|record| Candidate {
      mini_pct: h2h.mini_win_pct(record.team_id, &members),
      record,
    })
    .collect();

  candidates.sort_by(|a, b| {
    CASCADE
      .iter()
      .fold(Ordering::Equal, |ord, tb| ord.then_with(|| tb.compare(a, b)))
  });

  candidates.into_iter().map(|c| c.record).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn team(season: Uuid, wins: u32, losses: u32, pf: u64, pa: u64) -> TeamSeasonRecord {
    TeamSeasonRecord {
      wins,
      losses,
      points_for: pf,
      points_against: pa,
      ..TeamSeasonRecord::zeroed(Uuid::new_v4(), season)
    }
  }

  fn meeting(table: &mut HeadToHeadTable, season: Uuid, winner: Uuid, loser: Uuid) {
    let w = table.get(winner, loser).copied().unwrap_or(HeadToHeadRecord::zeroed(season, winner, loser));
    let l = table.get(loser, winner).copied().unwrap_or(HeadToHeadRecord::zeroed(season, loser, winner));
    table.insert(w.after_win(1, 0));
    table.insert(l.after_loss(0, 1));
  }

  fn ids(order: &[TeamSeasonRecord]) -> Vec<Uuid> { order.iter().map(|r| r.team_id).collect() }

  #[test]
  fn head_to_head_winner_ranks_first() {
    let season = Uuid::new_v4();
    let a = team(season, 5, 0, 400, 350);
    let b = team(season, 5, 0, 500, 300);
    let mut table = HeadToHeadTable::new();
    meeting(&mut table, season, a.team_id, b.team_id);

    let order = resolve(vec![b, a], &table);
    assert_eq!(ids(&order), vec![a.team_id, b.team_id]);
  }

  #[test]
  fn circular_head_to_head_falls_through_to_points_allowed() {
    let season = Uuid::new_v4();
    let a = team(season, 2, 1, 300, 290);
    let b = team(season, 2, 1, 300, 280);
    let c = team(season, 2, 1, 300, 295);
    let mut table = HeadToHeadTable::new();
    meeting(&mut table, season, a.team_id, b.team_id);
    meeting(&mut table, season, b.team_id, c.team_id);
    meeting(&mut table, season, c.team_id, a.team_id);

    for t in [a, b, c] {
      let members = [a.team_id, b.team_id, c.team_id];
      assert_eq!(table.mini_win_pct(t.team_id, &members), WinPct::new(1, 2));
    }

    let order = resolve(vec![a, b, c], &table);
    assert_eq!(ids(&order), vec![b.team_id, a.team_id, c.team_id]);
  }

  #[test]
  fn points_scored_breaks_equal_points_allowed() {
    let season = Uuid::new_v4();
    let a = team(season, 1, 1, 150, 160);
    let b = team(season, 1, 1, 170, 160);
    let order = resolve(vec![a, b], &HeadToHeadTable::new());
    assert_eq!(ids(&order), vec![b.team_id, a.team_id]);
  }

  #[test]
  fn lower_rung_never_undoes_head_to_head() {
    let season = Uuid::new_v4();
    // `a` won the meeting but has far worse point totals.
    let a = team(season, 3, 1, 200, 400);
    let b = team(season, 3, 1, 400, 200);
    let mut table = HeadToHeadTable::new();
    meeting(&mut table, season, a.team_id, b.team_id);

    let order = resolve(vec![b, a], &table);
    assert_eq!(ids(&order), vec![a.team_id, b.team_id]);
  }

  #[test]
  fn complete_tie_keeps_input_order() {
    let season = Uuid::new_v4();
    let group: Vec<_> = (0..4).map(|_| team(season, 0, 0, 0, 0)).collect();
    let order = resolve(group.clone(), &HeadToHeadTable::new());
    assert_eq!(ids(&order), ids(&group));
  }

  #[test]
  fn meetings_outside_the_group_are_ignored() {
    let season = Uuid::new_v4();
    let a = team(season, 1, 1, 100, 100);
    let b = team(season, 1, 1, 100, 90);
    let outsider = Uuid::new_v4();
    let mut table = HeadToHeadTable::new();
    meeting(&mut table, season, a.team_id, outsider);

    let order = resolve(vec![a, b], &table);
    assert_eq!(ids(&order), vec![b.team_id, a.team_id]);
  }
}
