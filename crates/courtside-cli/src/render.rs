//! Plain-text rendering for terminal output.

use std::collections::HashMap;

use courtside_core::{record::HeadToHeadRecord, standings::StandingsEntry};
use uuid::Uuid;

fn name_of(names: &HashMap<Uuid, String>, id: Uuid) -> String {
  names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// `W3` / `L2` / `-`.
pub fn streak(streak: i32) -> String {
  match streak {
    0 => "-".to_string(),
    s if s > 0 => format!("W{s}"),
    s => format!("L{}", s.unsigned_abs()),
  }
}

/// Render a standings table, one team per line.
pub fn standings_table(entries: &[StandingsEntry], names: &HashMap<Uuid, String>) -> String {
  let rows: Vec<(usize, String, &StandingsEntry)> = entries
    .iter()
    .map(|e| (e.rank, name_of(names, e.record.team_id), e))
    .collect();
  let width = rows.iter().map(|(_, n, _)| n.chars().count()).max().unwrap_or(0).max(4);

  let mut out = format!(
    "{:>3}  {:<width$}  {:>3}  {:>3}  {:>5}  {:>5}  {:>5}  {:>6}  {:>4}\n",
    "#", "Team", "W", "L", "Pct", "PF", "PA", "Diff", "Strk"
  );
  for (rank, name, e) in rows {
    out.push_str(&format!(
      "{:>3}  {:<width$}  {:>3}  {:>3}  {:>5.3}  {:>5}  {:>5}  {:>+6}  {:>4}\n",
      rank,
      name,
      e.record.wins,
      e.record.losses,
      e.win_pct,
      e.record.points_for,
      e.record.points_against,
      e.point_differential,
      streak(e.record.streak),
    ));
  }
  out
}

/// One-line summary of a head-to-head record.
pub fn head_to_head_line(rec: &HeadToHeadRecord, names: &HashMap<Uuid, String>) -> String {
  format!(
    "{} vs {}: {}-{} ({} scored, {} allowed)",
    name_of(names, rec.team_id),
    name_of(names, rec.opponent_id),
    rec.wins,
    rec.losses,
    rec.points_for,
    rec.points_against,
  )
}
