//! [`SqliteStore`]: the SQLite implementation of [`LeagueStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use courtside_core::{
  game::{Game, GameStatus, NewGame},
  ingest::GameTally,
  league::{NewSeason, NewTeam, Season, SeasonPatch, Team, TeamPatch},
  record::{HeadToHeadRecord, TeamSeasonRecord},
  roster::{NewPlayer, Player, PlayerPatch, PlayerQuery},
  stats::{NewStatLine, StatLine, StatLinePatch, StatQuery},
  store::{AggregateStore, GameQuery, LeagueStore},
};

use crate::{
  encode::{
    GAME_COLUMNS, HEAD_TO_HEAD_COLUMNS, PLAYER_COLUMNS, RawGame, RawHeadToHead, RawPlayer,
    RawSeason, RawStatLine, RawTeam, RawTeamSeason, SEASON_COLUMNS, STAT_LINE_COLUMNS,
    TEAM_COLUMNS, TEAM_SEASON_COLUMNS, encode_date, encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── SQL ─────────────────────────────────────────────────────────────────────

const TEAM_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM teams WHERE team_id = ?1)";
const SEASON_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM seasons WHERE season_id = ?1)";
const GAME_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM games WHERE game_id = ?1)";
const PLAYER_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM players WHERE player_id = ?1)";

const ENROLL: &str = "INSERT OR IGNORE INTO team_seasons (team_id, season_id) VALUES (?1, ?2)";

// A version-0 write may be the first one, so it inserts; later writes only
// ever update an existing row. Both only touch a row whose stored version
// equals ?8, and store ?8 + 1.
const INSERT_TEAM_SEASON: &str = "
  INSERT INTO team_seasons
    (team_id, season_id, wins, losses, points_for, points_against, streak, version)
  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8 + 1)
  ON CONFLICT (team_id, season_id) DO UPDATE SET
    wins           = excluded.wins,
    losses         = excluded.losses,
    points_for     = excluded.points_for,
    points_against = excluded.points_against,
    streak         = excluded.streak,
    version        = excluded.version
  WHERE team_seasons.version = ?8";

const UPDATE_TEAM_SEASON: &str = "
  UPDATE team_seasons SET
    wins = ?3, losses = ?4, points_for = ?5, points_against = ?6, streak = ?7,
    version = ?8 + 1
  WHERE team_id = ?1 AND season_id = ?2 AND version = ?8";

const INSERT_HEAD_TO_HEAD: &str = "
  INSERT INTO head_to_heads
    (season_id, team_id, opponent_id, wins, losses, points_for, points_against, version)
  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8 + 1)
  ON CONFLICT (season_id, team_id, opponent_id) DO UPDATE SET
    wins           = excluded.wins,
    losses         = excluded.losses,
    points_for     = excluded.points_for,
    points_against = excluded.points_against,
    version        = excluded.version
  WHERE head_to_heads.version = ?8";

const UPDATE_HEAD_TO_HEAD: &str = "
  UPDATE head_to_heads SET
    wins = ?4, losses = ?5, points_for = ?6, points_against = ?7,
    version = ?8 + 1
  WHERE season_id = ?1 AND team_id = ?2 AND opponent_id = ?3 AND version = ?8";

fn exists(conn: &rusqlite::Connection, sql: &str, id: &str) -> rusqlite::Result<bool> {
  conn.query_row(sql, [id], |row| row.get(0))
}

/// Returns whether the version check passed and the row was written.
fn write_team_season(conn: &rusqlite::Connection, raw: &RawTeamSeason) -> rusqlite::Result<bool> {
  let sql = if raw.version == 0 { INSERT_TEAM_SEASON } else { UPDATE_TEAM_SEASON };
  let changed = conn.execute(
    sql,
    rusqlite::params![
      raw.team_id,
      raw.season_id,
      raw.wins,
      raw.losses,
      raw.points_for,
      raw.points_against,
      raw.streak,
      raw.version,
    ],
  )?;
  Ok(changed == 1)
}

fn write_head_to_head(conn: &rusqlite::Connection, raw: &RawHeadToHead) -> rusqlite::Result<bool> {
  let sql = if raw.version == 0 { INSERT_HEAD_TO_HEAD } else { UPDATE_HEAD_TO_HEAD };
  let changed = conn.execute(
    sql,
    rusqlite::params![
      raw.season_id,
      raw.team_id,
      raw.opponent_id,
      raw.wins,
      raw.losses,
      raw.points_for,
      raw.points_against,
      raw.version,
    ],
  )?;
  Ok(changed == 1)
}

/// Whether another row of `table` already uses `name`.
fn name_taken(
  conn: &rusqlite::Connection,
  table: &str,
  id_column: &str,
  name: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  conn.query_row(
    &format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE name = ?1 AND {id_column} != ?2)"),
    [name, id],
    |row| row.get(0),
  )
}

fn select_game(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawGame>> {
  conn
    .query_row(
      &format!("SELECT {GAME_COLUMNS} FROM games WHERE game_id = ?1"),
      [id],
      RawGame::from_row,
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Courtside league store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AggregateStore impl ─────────────────────────────────────────────────────

impl AggregateStore for SqliteStore {
  type Error = Error;

  async fn get_or_create_team_season(
    &self,
    team_id: Uuid,
    season_id: Uuid,
  ) -> Result<TeamSeasonRecord> {
    let team_str   = encode_uuid(team_id);
    let season_str = encode_uuid(season_id);

    let raw = self
      .conn
      .call(move |conn| {
        if !exists(conn, TEAM_EXISTS, &team_str)? {
          return Ok(Err(Error::TeamNotFound(team_id)));
        }
        if !exists(conn, SEASON_EXISTS, &season_str)? {
          return Ok(Err(Error::SeasonNotFound(season_id)));
        }
        conn.execute(ENROLL, rusqlite::params![team_str, season_str])?;
        let raw = conn.query_row(
          &format!(
            "SELECT {TEAM_SEASON_COLUMNS} FROM team_seasons
             WHERE team_id = ?1 AND season_id = ?2"
          ),
          rusqlite::params![team_str, season_str],
          RawTeamSeason::from_row,
        )?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_record()
  }

  async fn upsert_team_season(&self, record: TeamSeasonRecord) -> Result<TeamSeasonRecord> {
    let raw = RawTeamSeason::encode(&record)?;

    let written = self
      .conn
      .call(move |conn| {
        if !exists(conn, TEAM_EXISTS, &raw.team_id)? {
          return Ok(Err(Error::TeamNotFound(record.team_id)));
        }
        if !exists(conn, SEASON_EXISTS, &raw.season_id)? {
          return Ok(Err(Error::SeasonNotFound(record.season_id)));
        }
        Ok(Ok(write_team_season(conn, &raw)?))
      })
      .await??;

    if !written {
      return Err(Error::StaleVersion { table: "team_seasons", expected: record.version });
    }
    Ok(TeamSeasonRecord { version: record.version + 1, ..record })
  }

  async fn get_or_create_head_to_head(
    &self,
    season_id: Uuid,
    team_id: Uuid,
    opponent_id: Uuid,
  ) -> Result<HeadToHeadRecord> {
    if team_id == opponent_id {
      return Err(Error::Rejected(format!("team {team_id} cannot face itself")));
    }
    let season_str   = encode_uuid(season_id);
    let team_str     = encode_uuid(team_id);
    let opponent_str = encode_uuid(opponent_id);

    let raw = self
      .conn
      .call(move |conn| {
        for (id, id_str) in [(team_id, &team_str), (opponent_id, &opponent_str)] {
          if !exists(conn, TEAM_EXISTS, id_str)? {
            return Ok(Err(Error::TeamNotFound(id)));
          }
        }
        if !exists(conn, SEASON_EXISTS, &season_str)? {
          return Ok(Err(Error::SeasonNotFound(season_id)));
        }
        conn.execute(
          "INSERT OR IGNORE INTO head_to_heads (season_id, team_id, opponent_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![season_str, team_str, opponent_str],
        )?;
        let raw = conn.query_row(
          &format!(
            "SELECT {HEAD_TO_HEAD_COLUMNS} FROM head_to_heads
             WHERE season_id = ?1 AND team_id = ?2 AND opponent_id = ?3"
          ),
          rusqlite::params![season_str, team_str, opponent_str],
          RawHeadToHead::from_row,
        )?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_record()
  }

  async fn upsert_head_to_head(&self, record: HeadToHeadRecord) -> Result<HeadToHeadRecord> {
    if record.team_id == record.opponent_id {
      return Err(Error::Rejected(format!("team {} cannot face itself", record.team_id)));
    }
    let raw = RawHeadToHead::encode(&record)?;

    let written = self
      .conn
      .call(move |conn| {
        for (id, id_str) in [(record.team_id, &raw.team_id), (record.opponent_id, &raw.opponent_id)] {
          if !exists(conn, TEAM_EXISTS, id_str)? {
            return Ok(Err(Error::TeamNotFound(id)));
          }
        }
        if !exists(conn, SEASON_EXISTS, &raw.season_id)? {
          return Ok(Err(Error::SeasonNotFound(record.season_id)));
        }
        Ok(Ok(write_head_to_head(conn, &raw)?))
      })
      .await??;

    if !written {
      return Err(Error::StaleVersion { table: "head_to_heads", expected: record.version });
    }
    Ok(HeadToHeadRecord { version: record.version + 1, ..record })
  }

  async fn list_team_seasons_by_season(&self, season_id: Uuid) -> Result<Vec<TeamSeasonRecord>> {
    let season_str = encode_uuid(season_id);

    let raws = self
      .conn
      .call(move |conn| {
        if !exists(conn, SEASON_EXISTS, &season_str)? {
          return Ok(Err(Error::SeasonNotFound(season_id)));
        }
        let mut stmt = conn.prepare(&format!(
          "SELECT {TEAM_SEASON_COLUMNS} FROM team_seasons
           WHERE season_id = ?1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map([&season_str], RawTeamSeason::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Ok(rows))
      })
      .await??;

    raws.into_iter().map(RawTeamSeason::into_record).collect()
  }

  async fn list_head_to_head_by_team(
    &self,
    season_id: Uuid,
    team_id: Uuid,
  ) -> Result<Vec<HeadToHeadRecord>> {
    let season_str = encode_uuid(season_id);
    let team_str   = encode_uuid(team_id);

    let raws: Vec<RawHeadToHead> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HEAD_TO_HEAD_COLUMNS} FROM head_to_heads
           WHERE season_id = ?1 AND team_id = ?2
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![season_str, team_str], RawHeadToHead::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHeadToHead::into_record).collect()
  }

  async fn commit_tally(&self, tally: GameTally) -> Result<GameTally> {
    let teams = [
      (RawTeamSeason::encode(&tally.home)?, tally.home.version),
      (RawTeamSeason::encode(&tally.away)?, tally.away.version),
    ];
    let pairs = [
      (RawHeadToHead::encode(&tally.home_vs_away)?, tally.home_vs_away.version),
      (RawHeadToHead::encode(&tally.away_vs_home)?, tally.away_vs_home.version),
    ];

    self
      .conn
      .call(move |conn| {
        // Returning before `commit` drops the transaction, which rolls back.
        let tx = conn.transaction()?;
        for (raw, version) in &teams {
          if !write_team_season(&tx, raw)? {
            return Ok(Err(Error::StaleVersion { table: "team_seasons", expected: *version }));
          }
        }
        for (raw, version) in &pairs {
          if !write_head_to_head(&tx, raw)? {
            return Ok(Err(Error::StaleVersion { table: "head_to_heads", expected: *version }));
          }
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    let GameTally { home, away, home_vs_away, away_vs_home } = tally;
    Ok(GameTally {
      home:         TeamSeasonRecord { version: home.version + 1, ..home },
      away:         TeamSeasonRecord { version: away.version + 1, ..away },
      home_vs_away: HeadToHeadRecord { version: home_vs_away.version + 1, ..home_vs_away },
      away_vs_home: HeadToHeadRecord { version: away_vs_home.version + 1, ..away_vs_home },
    })
  }
}

// ─── LeagueStore impl ────────────────────────────────────────────────────────

impl LeagueStore for SqliteStore {
  // ── Teams ─────────────────────────────────────────────────────────────────

  async fn add_team(&self, input: NewTeam) -> Result<Team> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Rejected("team name must not be empty".into()));
    }
    let team = Team { team_id: Uuid::new_v4(), name, logo: input.logo, created_at: Utc::now() };

    let id_str = encode_uuid(team.team_id);
    let name   = team.name.clone();
    let logo   = team.logo.clone();
    let at_str = encode_dt(team.created_at);

    self
      .conn
      .call(move |conn| {
        if exists(conn, "SELECT EXISTS (SELECT 1 FROM teams WHERE name = ?1)", &name)? {
          return Ok(Err(Error::DuplicateName(name)));
        }
        conn.execute(
          "INSERT INTO teams (team_id, name, logo, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, logo, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(team)
  }

  async fn get_team(&self, team_id: Uuid) -> Result<Option<Team>> {
    let id_str = encode_uuid(team_id);

    let raw: Option<RawTeam> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?1"),
            [&id_str],
            RawTeam::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTeam::into_team).transpose()
  }

  async fn list_teams(&self, name: Option<String>) -> Result<Vec<Team>> {
    let raws: Vec<RawTeam> = self
      .conn
      .call(move |conn| {
        // LIKE is case-insensitive for ASCII in SQLite.
        let mut stmt = conn.prepare(&format!(
          "SELECT {TEAM_COLUMNS} FROM teams
           WHERE ?1 IS NULL OR name LIKE '%' || ?1 || '%'
           ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([name.as_deref()], RawTeam::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTeam::into_team).collect()
  }

  async fn update_team(&self, team_id: Uuid, patch: TeamPatch) -> Result<Team> {
    let team = self
      .get_team(team_id)
      .await?
      .ok_or(Error::TeamNotFound(team_id))?
      .patched(patch);
    if team.name.is_empty() {
      return Err(Error::Rejected("team name must not be empty".into()));
    }

    let id_str = encode_uuid(team_id);
    let name   = team.name.clone();
    let logo   = team.logo.clone();

    self
      .conn
      .call(move |conn| {
        if name_taken(conn, "teams", "team_id", &name, &id_str)? {
          return Ok(Err(Error::DuplicateName(name)));
        }
        let changed = conn.execute(
          "UPDATE teams SET name = ?2, logo = ?3 WHERE team_id = ?1",
          rusqlite::params![id_str, name, logo],
        )?;
        Ok(if changed == 0 { Err(Error::TeamNotFound(team_id)) } else { Ok(()) })
      })
      .await??;

    Ok(team)
  }

  async fn delete_team(&self, team_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(team_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, TEAM_EXISTS, &id_str)? {
          return Ok(Err(Error::TeamNotFound(team_id)));
        }
        let in_use = |reason: &'static str| Error::InUse { what: "team", id: team_id, reason };
        if exists(&tx, "SELECT EXISTS (SELECT 1 FROM players WHERE team_id = ?1)", &id_str)? {
          return Ok(Err(in_use("it has players")));
        }
        if exists(
          &tx,
          "SELECT EXISTS (SELECT 1 FROM games WHERE home_team_id = ?1 OR away_team_id = ?1)",
          &id_str,
        )? {
          return Ok(Err(in_use("it has games")));
        }
        // Without games, its aggregate rows are zeroed enrollments.
        tx.execute(
          "DELETE FROM head_to_heads WHERE team_id = ?1 OR opponent_id = ?1",
          [&id_str],
        )?;
        tx.execute("DELETE FROM team_seasons WHERE team_id = ?1", [&id_str])?;
        tx.execute("DELETE FROM teams WHERE team_id = ?1", [&id_str])?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Seasons ───────────────────────────────────────────────────────────────

  async fn add_season(&self, input: NewSeason) -> Result<Season> {
    if !input.has_valid_dates() {
      return Err(Error::Rejected(format!(
        "season must end after it starts ({} to {})",
        input.start_date, input.end_date
      )));
    }
    let season = Season {
      season_id:  Uuid::new_v4(),
      name:       input.name.trim().to_owned(),
      start_date: input.start_date,
      end_date:   input.end_date,
      is_active:  input.is_active,
    };
    if season.name.is_empty() {
      return Err(Error::Rejected("season name must not be empty".into()));
    }

    let id_str    = encode_uuid(season.season_id);
    let name      = season.name.clone();
    let start_str = encode_date(season.start_date);
    let end_str   = encode_date(season.end_date);
    let is_active = season.is_active;

    self
      .conn
      .call(move |conn| {
        if exists(conn, "SELECT EXISTS (SELECT 1 FROM seasons WHERE name = ?1)", &name)? {
          return Ok(Err(Error::DuplicateName(name)));
        }
        conn.execute(
          "INSERT INTO seasons (season_id, name, start_date, end_date, is_active)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, start_str, end_str, is_active],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(season)
  }

  async fn get_season(&self, season_id: Uuid) -> Result<Option<Season>> {
    let id_str = encode_uuid(season_id);

    let raw: Option<RawSeason> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE season_id = ?1"),
            [&id_str],
            RawSeason::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSeason::into_season).transpose()
  }

  async fn list_seasons(&self, active: Option<bool>) -> Result<Vec<Season>> {
    let raws: Vec<RawSeason> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SEASON_COLUMNS} FROM seasons
           WHERE ?1 IS NULL OR is_active = ?1
           ORDER BY start_date DESC, rowid"
        ))?;
        let rows = stmt
          .query_map([active], RawSeason::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSeason::into_season).collect()
  }

  async fn update_season(&self, season_id: Uuid, patch: SeasonPatch) -> Result<Season> {
    let season = self
      .get_season(season_id)
      .await?
      .ok_or(Error::SeasonNotFound(season_id))?
      .patched(patch);
    if !season.has_valid_dates() {
      return Err(Error::Rejected(format!(
        "season must end after it starts ({} to {})",
        season.start_date, season.end_date
      )));
    }
    if season.name.is_empty() {
      return Err(Error::Rejected("season name must not be empty".into()));
    }

    let id_str    = encode_uuid(season_id);
    let name      = season.name.clone();
    let start_str = encode_date(season.start_date);
    let end_str   = encode_date(season.end_date);
    let is_active = season.is_active;

    self
      .conn
      .call(move |conn| {
        if name_taken(conn, "seasons", "season_id", &name, &id_str)? {
          return Ok(Err(Error::DuplicateName(name)));
        }
        let changed = conn.execute(
          "UPDATE seasons SET name = ?2, start_date = ?3, end_date = ?4, is_active = ?5
           WHERE season_id = ?1",
          rusqlite::params![id_str, name, start_str, end_str, is_active],
        )?;
        Ok(if changed == 0 { Err(Error::SeasonNotFound(season_id)) } else { Ok(()) })
      })
      .await??;

    Ok(season)
  }

  async fn delete_season(&self, season_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(season_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, SEASON_EXISTS, &id_str)? {
          return Ok(Err(Error::SeasonNotFound(season_id)));
        }
        if exists(&tx, "SELECT EXISTS (SELECT 1 FROM games WHERE season_id = ?1)", &id_str)? {
          return Ok(Err(Error::InUse { what: "season", id: season_id, reason: "it has games" }));
        }
        tx.execute("DELETE FROM head_to_heads WHERE season_id = ?1", [&id_str])?;
        tx.execute("DELETE FROM team_seasons WHERE season_id = ?1", [&id_str])?;
        tx.execute("DELETE FROM seasons WHERE season_id = ?1", [&id_str])?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Games ─────────────────────────────────────────────────────────────────

  async fn add_game(&self, input: NewGame) -> Result<Game> {
    if input.home_team_id == input.away_team_id {
      return Err(Error::Rejected(format!(
        "home and away team are the same team {}",
        input.home_team_id
      )));
    }
    let game = Game {
      game_id:      Uuid::new_v4(),
      season_id:    input.season_id,
      home_team_id: input.home_team_id,
      away_team_id: input.away_team_id,
      played_on:    input.played_on,
      location:     input.location,
      home_score:   None,
      away_score:   None,
      status:       GameStatus::Scheduled,
      notes:        input.notes,
    };

    let id_str     = encode_uuid(game.game_id);
    let season_str = encode_uuid(game.season_id);
    let home_str   = encode_uuid(game.home_team_id);
    let away_str   = encode_uuid(game.away_team_id);
    let date_str   = encode_date(game.played_on);
    let status_str = encode_status(game.status);
    let location   = game.location.clone();
    let notes      = game.notes.clone();
    let (season_id, home_id, away_id) = (game.season_id, game.home_team_id, game.away_team_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, SEASON_EXISTS, &season_str)? {
          return Ok(Err(Error::SeasonNotFound(season_id)));
        }
        for (id, id_str) in [(home_id, &home_str), (away_id, &away_str)] {
          if !exists(&tx, TEAM_EXISTS, id_str)? {
            return Ok(Err(Error::TeamNotFound(id)));
          }
        }
        tx.execute(
          "INSERT INTO games (
             game_id, season_id, home_team_id, away_team_id, played_on,
             location, status, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, season_str, home_str, away_str, date_str, location, status_str, notes,
          ],
        )?;
        for team_str in [&home_str, &away_str] {
          tx.execute(ENROLL, rusqlite::params![team_str, season_str])?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(game)
  }

  async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>> {
    let id_str = encode_uuid(game_id);

    let raw = self.conn.call(move |conn| Ok(select_game(conn, &id_str)?)).await?;

    raw.map(RawGame::into_game).transpose()
  }

  async fn list_games<'a>(&'a self, query: &'a GameQuery) -> Result<Vec<Game>> {
    let season_str = query.season_id.map(encode_uuid);
    let team_str   = query.team_id.map(encode_uuid);
    let status_str = query.status.map(encode_status);
    let from_str   = query.date_from.map(encode_date);
    let to_str     = query.date_to.map(encode_date);
    // A negative LIMIT means no limit in SQLite.
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawGame> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GAME_COLUMNS} FROM games
           WHERE (?1 IS NULL OR season_id = ?1)
             AND (?2 IS NULL OR home_team_id = ?2 OR away_team_id = ?2)
             AND (?3 IS NULL OR status = ?3)
             AND (?4 IS NULL OR played_on >= ?4)
             AND (?5 IS NULL OR played_on <= ?5)
           ORDER BY played_on, rowid
           LIMIT ?6 OFFSET ?7"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              season_str, team_str, status_str, from_str, to_str, limit_val, offset_val,
            ],
            RawGame::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGame::into_game).collect()
  }

  async fn update_game(&self, game: Game) -> Result<Game> {
    let game_id    = game.game_id;
    let id_str     = encode_uuid(game.game_id);
    let date_str   = encode_date(game.played_on);
    let status_str = encode_status(game.status);
    let home_score = game.home_score.map(i64::from);
    let away_score = game.away_score.map(i64::from);

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE games SET
             played_on = ?2, location = ?3, home_score = ?4, away_score = ?5,
             status = ?6, notes = ?7
           WHERE game_id = ?1",
          rusqlite::params![
            id_str, date_str, game.location, home_score, away_score, status_str, game.notes,
          ],
        )?;
        if changed == 0 {
          return Ok(Err(Error::GameNotFound(game_id)));
        }
        Ok(select_game(conn, &id_str)?.ok_or(Error::GameNotFound(game_id)))
      })
      .await??;

    raw.into_game()
  }

  async fn finalize_game(
    &self,
    game_id: Uuid,
    home_score: u32,
    away_score: u32,
  ) -> Result<Option<Game>> {
    let id_str    = encode_uuid(game_id);
    let final_str = encode_status(GameStatus::Final);

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE games SET home_score = ?2, away_score = ?3, status = ?4
           WHERE game_id = ?1 AND status != ?4",
          rusqlite::params![id_str, home_score, away_score, final_str],
        )?;
        if changed == 0 {
          return Ok(if exists(conn, GAME_EXISTS, &id_str)? {
            Ok(None)
          } else {
            Err(Error::GameNotFound(game_id))
          });
        }
        Ok(Ok(select_game(conn, &id_str)?))
      })
      .await??;

    raw.map(RawGame::into_game).transpose()
  }

  async fn delete_game(&self, game_id: Uuid) -> Result<()> {
    let id_str    = encode_uuid(game_id);
    let final_str = encode_status(GameStatus::Final);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let status: Option<String> = tx
          .query_row("SELECT status FROM games WHERE game_id = ?1", [&id_str], |row| row.get(0))
          .optional()?;
        let in_use = |reason: &'static str| Error::InUse { what: "game", id: game_id, reason };
        match status.as_deref() {
          None => return Ok(Err(Error::GameNotFound(game_id))),
          // Aggregates only ever grow, so a counted result cannot be taken back.
          Some(s) if s == final_str => {
            return Ok(Err(in_use("its result is counted in the standings")));
          }
          Some(_) => {}
        }
        if exists(&tx, "SELECT EXISTS (SELECT 1 FROM stat_lines WHERE game_id = ?1)", &id_str)? {
          return Ok(Err(in_use("it has stat lines")));
        }
        tx.execute("DELETE FROM games WHERE game_id = ?1", [&id_str])?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Players ───────────────────────────────────────────────────────────────

  async fn add_player(&self, input: NewPlayer) -> Result<Player> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Rejected("player name must not be empty".into()));
    }
    let player = Player {
      player_id: Uuid::new_v4(),
      team_id: input.team_id,
      name,
      jersey_number: input.jersey_number,
      position: input.position,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(player.player_id);
    let team_str = encode_uuid(player.team_id);
    let name     = player.name.clone();
    let number   = player.jersey_number.map(i64::from);
    let position = player.position.clone();
    let at_str   = encode_dt(player.created_at);
    let team_id  = player.team_id;

    self
      .conn
      .call(move |conn| {
        if !exists(conn, TEAM_EXISTS, &team_str)? {
          return Ok(Err(Error::TeamNotFound(team_id)));
        }
        conn.execute(
          "INSERT INTO players (player_id, team_id, name, jersey_number, position, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, team_str, name, number, position, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(player)
  }

  async fn get_player(&self, player_id: Uuid) -> Result<Option<Player>> {
    let id_str = encode_uuid(player_id);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
            [&id_str],
            RawPlayer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }

  async fn list_players<'a>(&'a self, query: &'a PlayerQuery) -> Result<Vec<Player>> {
    let name       = query.name.clone();
    let team_str   = query.team_id.map(encode_uuid);
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawPlayer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PLAYER_COLUMNS} FROM players
           WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%')
             AND (?2 IS NULL OR team_id = ?2)
           ORDER BY name, rowid
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![name, team_str, limit_val, offset_val],
            RawPlayer::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlayer::into_player).collect()
  }

  async fn update_player(&self, player_id: Uuid, patch: PlayerPatch) -> Result<Player> {
    let player = self
      .get_player(player_id)
      .await?
      .ok_or(Error::PlayerNotFound(player_id))?
      .patched(patch);
    if player.name.is_empty() {
      return Err(Error::Rejected("player name must not be empty".into()));
    }

    let id_str   = encode_uuid(player_id);
    let team_str = encode_uuid(player.team_id);
    let name     = player.name.clone();
    let number   = player.jersey_number.map(i64::from);
    let position = player.position.clone();
    let team_id  = player.team_id;

    self
      .conn
      .call(move |conn| {
        if !exists(conn, TEAM_EXISTS, &team_str)? {
          return Ok(Err(Error::TeamNotFound(team_id)));
        }
        let changed = conn.execute(
          "UPDATE players SET team_id = ?2, name = ?3, jersey_number = ?4, position = ?5
           WHERE player_id = ?1",
          rusqlite::params![id_str, team_str, name, number, position],
        )?;
        Ok(if changed == 0 { Err(Error::PlayerNotFound(player_id)) } else { Ok(()) })
      })
      .await??;

    Ok(player)
  }

  async fn delete_player(&self, player_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(player_id);

    self
      .conn
      .call(move |conn| {
        if !exists(conn, PLAYER_EXISTS, &id_str)? {
          return Ok(Err(Error::PlayerNotFound(player_id)));
        }
        if exists(conn, "SELECT EXISTS (SELECT 1 FROM stat_lines WHERE player_id = ?1)", &id_str)? {
          return Ok(Err(Error::InUse {
            what:   "player",
            id:     player_id,
            reason: "they have stat lines",
          }));
        }
        conn.execute("DELETE FROM players WHERE player_id = ?1", [&id_str])?;
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Stat lines ────────────────────────────────────────────────────────────

  async fn add_stat_line(&self, input: NewStatLine) -> Result<StatLine> {
    input.box_score.validate().map_err(|e| Error::Rejected(e.to_string()))?;
    let line = StatLine {
      stat_line_id: Uuid::new_v4(),
      game_id:      input.game_id,
      player_id:    input.player_id,
      box_score:    input.box_score.with_derived_points(),
      created_at:   Utc::now(),
    };
    let (game_id, player_id) = (line.game_id, line.player_id);
    let raw = RawStatLine::encode(&line);

    self
      .conn
      .call(move |conn| {
        if !exists(conn, GAME_EXISTS, &raw.game_id)? {
          return Ok(Err(Error::GameNotFound(game_id)));
        }
        if !exists(conn, PLAYER_EXISTS, &raw.player_id)? {
          return Ok(Err(Error::PlayerNotFound(player_id)));
        }
        let duplicate: bool = conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM stat_lines WHERE game_id = ?1 AND player_id = ?2)",
          [&raw.game_id, &raw.player_id],
          |row| row.get(0),
        )?;
        if duplicate {
          return Ok(Err(Error::DuplicateStatLine { game_id, player_id }));
        }
        let c = &raw.counts;
        conn.execute(
          &format!(
            "INSERT INTO stat_lines ({STAT_LINE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
          ),
          rusqlite::params![
            raw.stat_line_id,
            raw.game_id,
            raw.player_id,
            raw.minutes_played,
            c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11], c[12],
            raw.dnp,
            raw.created_at,
          ],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(line)
  }

  async fn get_stat_line(&self, stat_line_id: Uuid) -> Result<Option<StatLine>> {
    let id_str = encode_uuid(stat_line_id);

    let raw: Option<RawStatLine> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {STAT_LINE_COLUMNS} FROM stat_lines WHERE stat_line_id = ?1"),
            [&id_str],
            RawStatLine::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStatLine::into_stat_line).transpose()
  }

  async fn list_stat_lines<'a>(&'a self, query: &'a StatQuery) -> Result<Vec<StatLine>> {
    let game_str   = query.game_id.map(encode_uuid);
    let player_str = query.player_id.map(encode_uuid);
    let season_str = query.season_id.map(encode_uuid);
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawStatLine> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STAT_LINE_COLUMNS} FROM stat_lines
           WHERE (?1 IS NULL OR game_id = ?1)
             AND (?2 IS NULL OR player_id = ?2)
             AND (?3 IS NULL OR game_id IN (SELECT game_id FROM games WHERE season_id = ?3))
           ORDER BY rowid
           LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![game_str, player_str, season_str, limit_val, offset_val],
            RawStatLine::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStatLine::into_stat_line).collect()
  }

  async fn update_stat_line(&self, stat_line_id: Uuid, patch: StatLinePatch) -> Result<StatLine> {
    let mut line = self
      .get_stat_line(stat_line_id)
      .await?
      .ok_or(Error::StatLineNotFound(stat_line_id))?;
    line.box_score = line.box_score.patched(patch);
    line.box_score.validate().map_err(|e| Error::Rejected(e.to_string()))?;
    let raw = RawStatLine::encode(&line);

    self
      .conn
      .call(move |conn| {
        let c = &raw.counts;
        let changed = conn.execute(
          "UPDATE stat_lines SET
             minutes_played = ?2,
             points = ?3, rebounds = ?4, assists = ?5, steals = ?6, blocks = ?7,
             two_pt_made = ?8, two_pt_attempted = ?9,
             three_pt_made = ?10, three_pt_attempted = ?11,
             ft_made = ?12, ft_attempted = ?13,
             turnovers = ?14, fouls = ?15, dnp = ?16
           WHERE stat_line_id = ?1",
          rusqlite::params![
            raw.stat_line_id,
            raw.minutes_played,
            c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11], c[12],
            raw.dnp,
          ],
        )?;
        Ok(if changed == 0 { Err(Error::StatLineNotFound(stat_line_id)) } else { Ok(()) })
      })
      .await??;

    Ok(line)
  }

  async fn delete_stat_line(&self, stat_line_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(stat_line_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM stat_lines WHERE stat_line_id = ?1", [&id_str])?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::StatLineNotFound(stat_line_id));
    }
    Ok(())
  }
}
