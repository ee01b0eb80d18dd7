//! Store traits consumed by the engine and the API.
//!
//! [`AggregateStore`] is the narrow interface the standings engine needs.
//! [`LeagueStore`] extends it with the registry used by the HTTP layer: teams,
//! seasons, the game schedule, player rosters and per-game stat lines. Both are implemented by storage backends (e.g.
//! `courtside-store-sqlite`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  game::{Game, GameStatus, NewGame},
  ingest::GameTally,
  league::{NewSeason, NewTeam, Season, SeasonPatch, Team, TeamPatch},
  record::{HeadToHeadRecord, TeamSeasonRecord},
  roster::{NewPlayer, Player, PlayerPatch, PlayerQuery},
  stats::{NewStatLine, StatLine, StatLinePatch, StatQuery},
};

// ─── Failure classification ──────────────────────────────────────────────────

/// Coarse category of a backend failure, used by the engine to decide
/// between retrying, surfacing a 404, or propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// A referenced season, team or game does not exist.
  NotFound,
  /// An optimistic version check failed, a uniqueness rule was hit, or a
  /// delete was refused because other rows still depend on the target.
  Conflict,
  /// The request itself was refused (bad dates, same team twice, ...).
  Rejected,
  /// I/O or backend failure.
  Unavailable,
}

/// Implemented by every backend error type.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> FailureKind;
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`LeagueStore::list_games`].
#[derive(Debug, Clone, Default)]
pub struct GameQuery {
  pub season_id: Option<Uuid>,
  /// Matches either the home or the away side.
  pub team_id:   Option<Uuid>,
  pub status:    Option<GameStatus>,
  pub date_from: Option<NaiveDate>,
  pub date_to:   Option<NaiveDate>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Durable access to team-season and head-to-head aggregates.
///
/// Writes are version-checked: an upsert succeeds only when the stored
/// `version` equals the record's `version`, and the stored row then carries
/// `version + 1`. A mismatch is reported with [`FailureKind::Conflict`].
pub trait AggregateStore: Send + Sync {
  type Error: StoreFailure;

  /// Fetch the record, creating a zeroed row if none exists.
  /// Fails with [`FailureKind::NotFound`] if the team or season is unknown.
  fn get_or_create_team_season(
    &self,
    team_id: Uuid,
    season_id: Uuid,
  ) -> impl Future<Output = Result<TeamSeasonRecord, Self::Error>> + Send + '_;

  /// Write one record; returns it with its new version.
  fn upsert_team_season(
    &self,
    record: TeamSeasonRecord,
  ) -> impl Future<Output = Result<TeamSeasonRecord, Self::Error>> + Send + '_;

  /// Fetch `team_id`'s record against `opponent_id`, creating a zeroed row if
  /// none exists.
  fn get_or_create_head_to_head(
    &self,
    season_id: Uuid,
    team_id: Uuid,
    opponent_id: Uuid,
  ) -> impl Future<Output = Result<HeadToHeadRecord, Self::Error>> + Send + '_;

  fn upsert_head_to_head(
    &self,
    record: HeadToHeadRecord,
  ) -> impl Future<Output = Result<HeadToHeadRecord, Self::Error>> + Send + '_;

  /// All team records in a season, in store order.
  fn list_team_seasons_by_season(
    &self,
    season_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TeamSeasonRecord>, Self::Error>> + Send + '_;

  /// All of a team's head-to-head rows in a season, one per opponent met.
  fn list_head_to_head_by_team(
    &self,
    season_id: Uuid,
    team_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HeadToHeadRecord>, Self::Error>> + Send + '_;

  /// Persist the four rows of one game atomically.
  ///
  /// Either every row passes its version check and is written, or nothing is
  /// written and a [`FailureKind::Conflict`] is returned.
  fn commit_tally(
    &self,
    tally: GameTally,
  ) -> impl Future<Output = Result<GameTally, Self::Error>> + Send + '_;
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Teams, seasons, the game schedule, rosters and stat lines.
///
/// Deletes are refused with [`FailureKind::Conflict`] while dependent rows
/// exist: a team with players or games, a season with games, a game with stat
/// lines or a final result, a player with stat lines.
pub trait LeagueStore: AggregateStore {
  // ── Teams ─────────────────────────────────────────────────────────────

  /// Returns a conflict if the name is taken.
  fn add_team(
    &self,
    input: NewTeam,
  ) -> impl Future<Output = Result<Team, Self::Error>> + Send + '_;

  fn get_team(
    &self,
    team_id: Uuid,
  ) -> impl Future<Output = Result<Option<Team>, Self::Error>> + Send + '_;

  /// List teams, optionally filtered by a case-insensitive name substring.
  fn list_teams(
    &self,
    name: Option<String>,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  /// Returns a conflict if the new name belongs to another team.
  fn update_team(
    &self,
    team_id: Uuid,
    patch: TeamPatch,
  ) -> impl Future<Output = Result<Team, Self::Error>> + Send + '_;

  fn delete_team(
    &self,
    team_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Seasons ───────────────────────────────────────────────────────────

  /// Returns a conflict if the name is taken, and rejects an end date
  /// before the start date.
  fn add_season(
    &self,
    input: NewSeason,
  ) -> impl Future<Output = Result<Season, Self::Error>> + Send + '_;

  fn get_season(
    &self,
    season_id: Uuid,
  ) -> impl Future<Output = Result<Option<Season>, Self::Error>> + Send + '_;

  fn list_seasons(
    &self,
    active: Option<bool>,
  ) -> impl Future<Output = Result<Vec<Season>, Self::Error>> + Send + '_;

  /// The merged dates must still be in order.
  fn update_season(
    &self,
    season_id: Uuid,
    patch: SeasonPatch,
  ) -> impl Future<Output = Result<Season, Self::Error>> + Send + '_;

  fn delete_season(
    &self,
    season_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Games ─────────────────────────────────────────────────────────────

  /// Schedule a game. The season and both teams must exist and the teams
  /// must differ.
  ///
  /// Both teams are enrolled in the season (given a zeroed record if they
  /// have none) in the same write, so a scheduled team always appears in the
  /// standings.
  fn add_game(
    &self,
    input: NewGame,
  ) -> impl Future<Output = Result<Game, Self::Error>> + Send + '_;

  fn get_game(
    &self,
    game_id: Uuid,
  ) -> impl Future<Output = Result<Option<Game>, Self::Error>> + Send + '_;

  /// Games matching `query`, ordered by date.
  fn list_games<'a>(
    &'a self,
    query: &'a GameQuery,
  ) -> impl Future<Output = Result<Vec<Game>, Self::Error>> + Send + 'a;

  /// Overwrite a game's mutable fields (date, location, scores, status,
  /// notes). Teams and season are fixed at creation.
  fn update_game(
    &self,
    game: Game,
  ) -> impl Future<Output = Result<Game, Self::Error>> + Send + '_;

  /// Record a final score, but only if the game is not already final.
  ///
  /// Returns `None` when the game was already final so callers never feed the
  /// same game to ingestion twice.
  fn finalize_game(
    &self,
    game_id: Uuid,
    home_score: u32,
    away_score: u32,
  ) -> impl Future<Output = Result<Option<Game>, Self::Error>> + Send + '_;

  fn delete_game(
    &self,
    game_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Players ───────────────────────────────────────────────────────────

  /// The team must exist.
  fn add_player(
    &self,
    input: NewPlayer,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  fn get_player(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  /// Players matching `query`, ordered by name.
  fn list_players<'a>(
    &'a self,
    query: &'a PlayerQuery,
  ) -> impl Future<Output = Result<Vec<Player>, Self::Error>> + Send + 'a;

  /// A new `team_id` must name an existing team.
  fn update_player(
    &self,
    player_id: Uuid,
    patch: PlayerPatch,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  fn delete_player(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Stat lines ────────────────────────────────────────────────────────

  /// Record a player's box score for a game. The game and player must exist,
  /// the shooting line must be consistent, and a player has at most one line
  /// per game. `points` is derived from made shots when entered as zero.
  fn add_stat_line(
    &self,
    input: NewStatLine,
  ) -> impl Future<Output = Result<StatLine, Self::Error>> + Send + '_;

  fn get_stat_line(
    &self,
    stat_line_id: Uuid,
  ) -> impl Future<Output = Result<Option<StatLine>, Self::Error>> + Send + '_;

  /// Lines matching `query`, in the order they were recorded.
  fn list_stat_lines<'a>(
    &'a self,
    query: &'a StatQuery,
  ) -> impl Future<Output = Result<Vec<StatLine>, Self::Error>> + Send + 'a;

  fn update_stat_line(
    &self,
    stat_line_id: Uuid,
    patch: StatLinePatch,
  ) -> impl Future<Output = Result<StatLine, Self::Error>> + Send + '_;

  fn delete_stat_line(
    &self,
    stat_line_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
