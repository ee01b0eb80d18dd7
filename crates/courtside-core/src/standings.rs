//! Standings ranker, the pure half.
//!
//! [`group_by_win_pct`] partitions a season's records into tiers of exactly
//! equal winning percentage, best tier first. The engine resolves each tier
//! of two or more teams with [`crate::tiebreak::resolve`] and hands the
//! concatenated order to [`into_entries`].

use serde::{Deserialize, Serialize};

use crate::record::{TeamSeasonRecord, WinPct};

/// One line of the standings table. Derived on every request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
  /// 1-based position in the table.
  pub rank:               usize,
  #[serde(flatten)]
  pub record:             TeamSeasonRecord,
  pub win_pct:            f64,
  pub point_differential: i64,
}

/// Split records into tiers of equal win percentage, best tier first.
///
/// Within a tier, records keep the order they were given in.
pub fn group_by_win_pct(mut records: Vec<TeamSeasonRecord>) -> Vec<Vec<TeamSeasonRecord>> {
  records.sort_by(|a, b| b.win_pct().cmp(&a.win_pct()));
  records
    .chunk_by(|a, b| a.win_pct() == b.win_pct())
    .map(<[TeamSeasonRecord]>::to_vec)
    .collect()
}

/// Number the final order.
pub fn into_entries(ordered: Vec<TeamSeasonRecord>) -> Vec<StandingsEntry> {
  ordered
    .into_iter()
    .enumerate()
    .map(|(i, record)| StandingsEntry {
      rank: i + 1,
      win_pct: record.win_pct().as_f64(),
      point_differential: record.point_differential(),
      record,
    })
    .collect()
}

/// The win percentage shared by every member of a tier.
pub fn tier_pct(tier: &[TeamSeasonRecord]) -> WinPct {
  tier.first().map(TeamSeasonRecord::win_pct).unwrap_or_default()
}
