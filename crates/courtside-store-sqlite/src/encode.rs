//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings and calendar dates are `YYYY-MM-DD`, so
//! both sort correctly as text. UUIDs are hyphenated lowercase strings.
//! Counters are stored as `INTEGER` and range-checked on the way in and out.

use chrono::{DateTime, NaiveDate, Utc};
use courtside_core::{
  game::{Game, GameStatus},
  league::{Season, Team},
  record::{HeadToHeadRecord, TeamSeasonRecord},
  roster::Player,
  stats::{BoxScore, StatLine},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn encode_status(status: GameStatus) -> &'static str { status.into() }

pub fn decode_status(s: &str) -> Result<GameStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown game status: {s:?}")))
}

/// Narrow a stored integer to its domain type.
fn decode_count<T: TryFrom<i64>>(column: &'static str, v: i64) -> Result<T> {
  T::try_from(v).map_err(|_| Error::Decode(format!("{column} out of range: {v}")))
}

fn encode_count(column: &'static str, v: u64) -> Result<i64> {
  i64::try_from(v).map_err(|_| Error::Decode(format!("{column} out of range: {v}")))
}

// ─── Registry rows ───────────────────────────────────────────────────────────

pub const TEAM_COLUMNS: &str = "team_id, name, logo, created_at";

/// Raw values read directly from a `teams` row.
pub struct RawTeam {
  pub team_id:    String,
  pub name:       String,
  pub logo:       Option<String>,
  pub created_at: String,
}

impl RawTeam {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      team_id:    row.get(0)?,
      name:       row.get(1)?,
      logo:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_team(self) -> Result<Team> {
    Ok(Team {
      team_id:    decode_uuid(&self.team_id)?,
      name:       self.name,
      logo:       self.logo,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const SEASON_COLUMNS: &str = "season_id, name, start_date, end_date, is_active";

/// Raw values read directly from a `seasons` row.
pub struct RawSeason {
  pub season_id:  String,
  pub name:       String,
  pub start_date: String,
  pub end_date:   String,
  pub is_active:  bool,
}

impl RawSeason {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      season_id:  row.get(0)?,
      name:       row.get(1)?,
      start_date: row.get(2)?,
      end_date:   row.get(3)?,
      is_active:  row.get(4)?,
    })
  }

  pub fn into_season(self) -> Result<Season> {
    Ok(Season {
      season_id:  decode_uuid(&self.season_id)?,
      name:       self.name,
      start_date: decode_date(&self.start_date)?,
      end_date:   decode_date(&self.end_date)?,
      is_active:  self.is_active,
    })
  }
}

pub const GAME_COLUMNS: &str = "game_id, season_id, home_team_id, away_team_id, played_on, \
                                location, home_score, away_score, status, notes";

/// Raw values read directly from a `games` row.
pub struct RawGame {
  pub game_id:      String,
  pub season_id:    String,
  pub home_team_id: String,
  pub away_team_id: String,
  pub played_on:    String,
  pub location:     Option<String>,
  pub home_score:   Option<i64>,
  pub away_score:   Option<i64>,
  pub status:       String,
  pub notes:        Option<String>,
}

impl RawGame {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      game_id:      row.get(0)?,
      season_id:    row.get(1)?,
      home_team_id: row.get(2)?,
      away_team_id: row.get(3)?,
      played_on:    row.get(4)?,
      location:     row.get(5)?,
      home_score:   row.get(6)?,
      away_score:   row.get(7)?,
      status:       row.get(8)?,
      notes:        row.get(9)?,
    })
  }

  pub fn into_game(self) -> Result<Game> {
    Ok(Game {
      game_id:      decode_uuid(&self.game_id)?,
      season_id:    decode_uuid(&self.season_id)?,
      home_team_id: decode_uuid(&self.home_team_id)?,
      away_team_id: decode_uuid(&self.away_team_id)?,
      played_on:    decode_date(&self.played_on)?,
      location:     self.location,
      home_score:   self.home_score.map(|v| decode_count("home_score", v)).transpose()?,
      away_score:   self.away_score.map(|v| decode_count("away_score", v)).transpose()?,
      status:       decode_status(&self.status)?,
      notes:        self.notes,
    })
  }
}

pub const PLAYER_COLUMNS: &str = "player_id, team_id, name, jersey_number, position, created_at";

/// Raw values read directly from a `players` row.
pub struct RawPlayer {
  pub player_id:     String,
  pub team_id:       String,
  pub name:          String,
  pub jersey_number: Option<i64>,
  pub position:      Option<String>,
  pub created_at:    String,
}

impl RawPlayer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      player_id:     row.get(0)?,
      team_id:       row.get(1)?,
      name:          row.get(2)?,
      jersey_number: row.get(3)?,
      position:      row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      player_id:     decode_uuid(&self.player_id)?,
      team_id:       decode_uuid(&self.team_id)?,
      name:          self.name,
      jersey_number: self
        .jersey_number
        .map(|v| decode_count("jersey_number", v))
        .transpose()?,
      position:      self.position,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

// ─── Stat lines ──────────────────────────────────────────────────────────────

pub const STAT_LINE_COLUMNS: &str = "stat_line_id, game_id, player_id, minutes_played, \
                                     points, rebounds, assists, steals, blocks, \
                                     two_pt_made, two_pt_attempted, three_pt_made, \
                                     three_pt_attempted, ft_made, ft_attempted, \
                                     turnovers, fouls, dnp, created_at";

/// Raw values of a `stat_lines` row.
///
/// `counts` holds the thirteen counting columns from `points` through
/// `fouls`, in [`STAT_LINE_COLUMNS`] order.
pub struct RawStatLine {
  pub stat_line_id:   String,
  pub game_id:        String,
  pub player_id:      String,
  pub minutes_played: Option<i64>,
  pub counts:         [i64; 13],
  pub dnp:            bool,
  pub created_at:     String,
}

impl RawStatLine {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let mut counts = [0_i64; 13];
    for (i, count) in counts.iter_mut().enumerate() {
      *count = row.get(4 + i)?;
    }
    Ok(Self {
      stat_line_id:   row.get(0)?,
      game_id:        row.get(1)?,
      player_id:      row.get(2)?,
      minutes_played: row.get(3)?,
      counts,
      dnp:            row.get(17)?,
      created_at:     row.get(18)?,
    })
  }

  pub fn encode(line: &StatLine) -> Self {
    let b = &line.box_score;
    Self {
      stat_line_id:   encode_uuid(line.stat_line_id),
      game_id:        encode_uuid(line.game_id),
      player_id:      encode_uuid(line.player_id),
      minutes_played: b.minutes_played.map(i64::from),
      counts:         [
        b.points,
        b.rebounds,
        b.assists,
        b.steals,
        b.blocks,
        b.two_pt_made,
        b.two_pt_attempted,
        b.three_pt_made,
        b.three_pt_attempted,
        b.ft_made,
        b.ft_attempted,
        b.turnovers,
        b.fouls,
      ]
      .map(i64::from),
      dnp:            b.dnp,
      created_at:     encode_dt(line.created_at),
    }
  }

  pub fn into_stat_line(self) -> Result<StatLine> {
    let mut c = [0_u32; 13];
    for (out, raw) in c.iter_mut().zip(self.counts) {
      *out = decode_count("stat count", raw)?;
    }
    let [
      points,
      rebounds,
      assists,
      steals,
      blocks,
      two_pt_made,
      two_pt_attempted,
      three_pt_made,
      three_pt_attempted,
      ft_made,
      ft_attempted,
      turnovers,
      fouls,
    ] = c;
    Ok(StatLine {
      stat_line_id: decode_uuid(&self.stat_line_id)?,
      game_id:      decode_uuid(&self.game_id)?,
      player_id:    decode_uuid(&self.player_id)?,
      box_score:    BoxScore {
        minutes_played: self
          .minutes_played
          .map(|v| decode_count("minutes_played", v))
          .transpose()?,
        points,
        rebounds,
        assists,
        steals,
        blocks,
        two_pt_made,
        two_pt_attempted,
        three_pt_made,
        three_pt_attempted,
        ft_made,
        ft_attempted,
        turnovers,
        fouls,
        dnp: self.dnp,
      },
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

// ─── Aggregate rows ──────────────────────────────────────────────────────────

pub const TEAM_SEASON_COLUMNS: &str =
  "team_id, season_id, wins, losses, points_for, points_against, streak, version";

/// Raw values of a `team_seasons` row, in either direction.
#[derive(Debug)]
pub struct RawTeamSeason {
  pub team_id:        String,
  pub season_id:      String,
  pub wins:           i64,
  pub losses:         i64,
  pub points_for:     i64,
  pub points_against: i64,
  pub streak:         i64,
  pub version:        i64,
}

impl RawTeamSeason {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      team_id:        row.get(0)?,
      season_id:      row.get(1)?,
      wins:           row.get(2)?,
      losses:         row.get(3)?,
      points_for:     row.get(4)?,
      points_against: row.get(5)?,
      streak:         row.get(6)?,
      version:        row.get(7)?,
    })
  }

  pub fn encode(record: &TeamSeasonRecord) -> Result<Self> {
    Ok(Self {
      team_id:        encode_uuid(record.team_id),
      season_id:      encode_uuid(record.season_id),
      wins:           i64::from(record.wins),
      losses:         i64::from(record.losses),
      points_for:     encode_count("points_for", record.points_for)?,
      points_against: encode_count("points_against", record.points_against)?,
      streak:         i64::from(record.streak),
      version:        encode_count("version", record.version)?,
    })
  }

  pub fn into_record(self) -> Result<TeamSeasonRecord> {
    Ok(TeamSeasonRecord {
      team_id:        decode_uuid(&self.team_id)?,
      season_id:      decode_uuid(&self.season_id)?,
      wins:           decode_count("wins", self.wins)?,
      losses:         decode_count("losses", self.losses)?,
      points_for:     decode_count("points_for", self.points_for)?,
      points_against: decode_count("points_against", self.points_against)?,
      streak:         decode_count("streak", self.streak)?,
      version:        decode_count("version", self.version)?,
    })
  }
}

pub const HEAD_TO_HEAD_COLUMNS: &str =
  "season_id, team_id, opponent_id, wins, losses, points_for, points_against, version";

/// Raw values of a `head_to_heads` row, in either direction.
#[derive(Debug)]
pub struct RawHeadToHead {
  pub season_id:      String,
  pub team_id:        String,
  pub opponent_id:    String,
  pub wins:           i64,
  pub losses:         i64,
  pub points_for:     i64,
  pub points_against: i64,
  pub version:        i64,
}

impl RawHeadToHead {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      season_id:      row.get(0)?,
      team_id:        row.get(1)?,
      opponent_id:    row.get(2)?,
      wins:           row.get(3)?,
      losses:         row.get(4)?,
      points_for:     row.get(5)?,
      points_against: row.get(6)?,
      version:        row.get(7)?,
    })
  }

  pub fn encode(record: &HeadToHeadRecord) -> Result<Self> {
    Ok(Self {
      season_id:      encode_uuid(record.season_id),
      team_id:        encode_uuid(record.team_id),
      opponent_id:    encode_uuid(record.opponent_id),
      wins:           i64::from(record.wins),
      losses:         i64::from(record.losses),
      points_for:     encode_count("points_for", record.points_for)?,
      points_against: encode_count("points_against", record.points_against)?,
      version:        encode_count("version", record.version)?,
    })
  }

  pub fn into_record(self) -> Result<HeadToHeadRecord> {
    Ok(HeadToHeadRecord {
      season_id:      decode_uuid(&self.season_id)?,
      team_id:        decode_uuid(&self.team_id)?,
      opponent_id:    decode_uuid(&self.opponent_id)?,
      wins:           decode_count("wins", self.wins)?,
      losses:         decode_count("losses", self.losses)?,
      points_for:     decode_count("points_for", self.points_for)?,
      points_against: decode_count("points_against", self.points_against)?,
      version:        decode_count("version", self.version)?,
    })
  }
}
