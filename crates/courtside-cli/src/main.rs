//! `courtside`, the command-line client for the Courtside league server.
//!
//! # Usage
//!
//! ```
//! courtside standings <season-id>
//! courtside h2h <season-id> <team-id> <opponent-id>
//! courtside --user manager --password secret final <game-id> 88 79
//! courtside --config ~/.config/courtside/config.toml standings <season-id>
//! ```

mod client;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "courtside", about = "Command-line client for the Courtside league server")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the courtside server (default: http://localhost:8080).
  #[arg(long, env = "COURTSIDE_URL")]
  url: Option<String>,

  /// League-manager username; only needed for writes.
  #[arg(long, env = "COURTSIDE_USER")]
  user: Option<String>,

  /// League-manager password (plaintext).
  #[arg(long, env = "COURTSIDE_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print a season's standings table.
  Standings { season: Uuid },

  /// Print one team's record against another in a season.
  H2h { season: Uuid, team: Uuid, opponent: Uuid },

  /// Record a game's final score and fold it into the standings.
  Final { game: Uuid, home_score: u32, away_score: u32 },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

/// CLI flags override the config file, which overrides defaults.
fn resolve_config(
  url: Option<String>,
  user: Option<String>,
  password: Option<String>,
  file: ConfigFile,
) -> ApiConfig {
  let non_empty = |s: String| (!s.is_empty()).then_some(s);
  ApiConfig {
    base_url: url
      .or_else(|| non_empty(file.url))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: user.or_else(|| non_empty(file.username)).unwrap_or_default(),
    password: password.or_else(|| non_empty(file.password)).unwrap_or_default(),
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(resolve_config(args.url, args.user, args.password, file_cfg))?;

  match args.command {
    Command::Standings { season } => {
      let entries = client.standings(season).await?;
      let names = client.team_names().await?;
      print!("{}", render::standings_table(&entries, &names));
    }
    Command::H2h { season, team, opponent } => {
      let record = client.head_to_head(season, team, opponent).await?;
      let names = client.team_names().await?;
      println!("{}", render::head_to_head_line(&record, &names));
    }
    Command::Final { game, home_score, away_score } => {
      let done = client.finalize(game, home_score, away_score).await?;
      let names = client.team_names().await?;
      println!(
        "final: {} {} - {} {}",
        names.get(&done.game.home_team_id).map_or("home", String::as_str),
        home_score,
        away_score,
        names.get(&done.game.away_team_id).map_or("away", String::as_str),
      );
      println!("home now {}-{}", done.tally.home.wins, done.tally.home.losses);
      println!("away now {}-{}", done.tally.away.wins, done.tally.away.losses);
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_file_and_defaults_fill_gaps() {
    let file = ConfigFile {
      url:      "http://league.example:9000".into(),
      username: "manager".into(),
      password: String::new(),
    };
    let cfg = resolve_config(None, Some("coach".into()), None, file);
    assert_eq!(cfg.base_url, "http://league.example:9000");
    assert_eq!(cfg.username, "coach");
    assert_eq!(cfg.password, "");

    let cfg = resolve_config(None, None, None, ConfigFile::default());
    assert_eq!(cfg.base_url, "http://localhost:8080");
  }

  #[test]
  fn final_subcommand_parses_scores() {
    let game = Uuid::new_v4();
    let args = Args::try_parse_from(["courtside", "final", &game.to_string(), "88", "79"]).unwrap();
    assert!(matches!(
      args.command,
      Command::Final { game: g, home_score: 88, away_score: 79 } if g == game
    ));
  }
}
