//! SQL schema for the Courtside SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS teams (
    team_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    logo        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS seasons (
    season_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    start_date  TEXT NOT NULL,          -- YYYY-MM-DD
    end_date    TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    CHECK (end_date > start_date)
);

CREATE TABLE IF NOT EXISTS games (
    game_id       TEXT PRIMARY KEY,
    season_id     TEXT NOT NULL REFERENCES seasons(season_id),
    home_team_id  TEXT NOT NULL REFERENCES teams(team_id),
    away_team_id  TEXT NOT NULL REFERENCES teams(team_id),
    played_on     TEXT NOT NULL,
    location      TEXT,
    home_score    INTEGER,
    away_score    INTEGER,
    status        TEXT NOT NULL DEFAULT 'scheduled',
    notes         TEXT,
    CHECK (home_team_id != away_team_id)
);

CREATE TABLE IF NOT EXISTS players (
    player_id      TEXT PRIMARY KEY,
    team_id        TEXT NOT NULL REFERENCES teams(team_id),
    name           TEXT NOT NULL,
    jersey_number  INTEGER,
    position       TEXT,
    created_at     TEXT NOT NULL
);

-- Counting stats only; percentages and fantasy points are derived on read.
CREATE TABLE IF NOT EXISTS stat_lines (
    stat_line_id        TEXT PRIMARY KEY,
    game_id             TEXT NOT NULL REFERENCES games(game_id),
    player_id           TEXT NOT NULL REFERENCES players(player_id),
    minutes_played      INTEGER,
    points              INTEGER NOT NULL DEFAULT 0,
    rebounds            INTEGER NOT NULL DEFAULT 0,
    assists             INTEGER NOT NULL DEFAULT 0,
    steals              INTEGER NOT NULL DEFAULT 0,
    blocks              INTEGER NOT NULL DEFAULT 0,
    two_pt_made         INTEGER NOT NULL DEFAULT 0,
    two_pt_attempted    INTEGER NOT NULL DEFAULT 0,
    three_pt_made       INTEGER NOT NULL DEFAULT 0,
    three_pt_attempted  INTEGER NOT NULL DEFAULT 0,
    ft_made             INTEGER NOT NULL DEFAULT 0,
    ft_attempted        INTEGER NOT NULL DEFAULT 0,
    turnovers           INTEGER NOT NULL DEFAULT 0,
    fouls               INTEGER NOT NULL DEFAULT 0,
    dnp                 INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    UNIQUE (game_id, player_id)
);

-- Aggregates. `version` counts writes and guards every update.
-- Lists read these in rowid order, which is the order rows were created.
CREATE TABLE IF NOT EXISTS team_seasons (
    team_id         TEXT NOT NULL REFERENCES teams(team_id),
    season_id       TEXT NOT NULL REFERENCES seasons(season_id),
    wins            INTEGER NOT NULL DEFAULT 0,
    losses          INTEGER NOT NULL DEFAULT 0,
    points_for      INTEGER NOT NULL DEFAULT 0,
    points_against  INTEGER NOT NULL DEFAULT 0,
    streak          INTEGER NOT NULL DEFAULT 0,
    version         INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (team_id, season_id)
);

CREATE TABLE IF NOT EXISTS head_to_heads (
    season_id       TEXT NOT NULL REFERENCES seasons(season_id),
    team_id         TEXT NOT NULL REFERENCES teams(team_id),
    opponent_id     TEXT NOT NULL REFERENCES teams(team_id),
    wins            INTEGER NOT NULL DEFAULT 0,
    losses          INTEGER NOT NULL DEFAULT 0,
    points_for      INTEGER NOT NULL DEFAULT 0,
    points_against  INTEGER NOT NULL DEFAULT 0,
    version         INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (season_id, team_id, opponent_id),
    CHECK (team_id != opponent_id)
);

CREATE INDEX IF NOT EXISTS games_season_idx        ON games(season_id);
CREATE INDEX IF NOT EXISTS games_played_on_idx     ON games(played_on);
CREATE INDEX IF NOT EXISTS team_seasons_season_idx ON team_seasons(season_id);
CREATE INDEX IF NOT EXISTS players_team_idx        ON players(team_id);
CREATE INDEX IF NOT EXISTS stat_lines_player_idx   ON stat_lines(player_id);

PRAGMA user_version = 1;
";
