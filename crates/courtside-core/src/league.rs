//! Teams and seasons: the registry that aggregates are keyed by.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A team registered with the league. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub team_id:    Uuid,
  pub name:       String,
  pub logo:       Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::LeagueStore::add_team`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeam {
  pub name: String,
  #[serde(default)]
  pub logo: Option<String>,
}

/// Changes to a team. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamPatch {
  pub name: Option<String>,
  pub logo: Option<String>,
}

impl Team {
  #[must_use]
  pub fn patched(self, patch: TeamPatch) -> Self {
    Self {
      name: patch.name.map_or(self.name, |n| n.trim().to_owned()),
      logo: patch.logo.or(self.logo),
      ..self
    }
  }
}

/// A bounded period that groups games and aggregates. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
  pub season_id:  Uuid,
  pub name:       String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub is_active:  bool,
}

/// Input to [`crate::store::LeagueStore::add_season`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSeason {
  pub name:       String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  #[serde(default = "default_active")]
  pub is_active:  bool,
}

fn default_active() -> bool { true }

/// A season must end strictly after it starts.
pub fn dates_in_order(start_date: NaiveDate, end_date: NaiveDate) -> bool {
  end_date > start_date
}

impl NewSeason {
  pub fn has_valid_dates(&self) -> bool { dates_in_order(self.start_date, self.end_date) }
}

/// Changes to a season. Absent fields are left as they are; the merged dates
/// must still be in order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeasonPatch {
  pub name:       Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub is_active:  Option<bool>,
}

impl Season {
  pub fn has_valid_dates(&self) -> bool { dates_in_order(self.start_date, self.end_date) }

  #[must_use]
  pub fn patched(self, patch: SeasonPatch) -> Self {
    Self {
      name: patch.name.map_or(self.name, |n| n.trim().to_owned()),
      start_date: patch.start_date.unwrap_or(self.start_date),
      end_date: patch.end_date.unwrap_or(self.end_date),
      is_active: patch.is_active.unwrap_or(self.is_active),
      ..self
    }
  }
}
