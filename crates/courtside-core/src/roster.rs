//! Players on a team's roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player. Belongs to exactly one team at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub player_id:     Uuid,
  pub team_id:       Uuid,
  pub name:          String,
  pub jersey_number: Option<u32>,
  pub position:      Option<String>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::LeagueStore::add_player`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlayer {
  pub team_id:       Uuid,
  pub name:          String,
  #[serde(default)]
  pub jersey_number: Option<u32>,
  #[serde(default)]
  pub position:      Option<String>,
}

/// Changes to a player. Moving to another team is a `team_id` change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerPatch {
  pub team_id:       Option<Uuid>,
  pub name:          Option<String>,
  pub jersey_number: Option<u32>,
  pub position:      Option<String>,
}

impl Player {
  #[must_use]
  pub fn patched(self, patch: PlayerPatch) -> Self {
    Self {
      team_id: patch.team_id.unwrap_or(self.team_id),
      name: patch.name.map_or(self.name, |n| n.trim().to_owned()),
      jersey_number: patch.jersey_number.or(self.jersey_number),
      position: patch.position.or(self.position),
      ..self
    }
  }
}

/// Parameters for [`crate::store::LeagueStore::list_players`].
#[derive(Debug, Clone, Default)]
pub struct PlayerQuery {
  /// Case-insensitive name substring.
  pub name:    Option<String>,
  pub team_id: Option<Uuid>,
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
}
