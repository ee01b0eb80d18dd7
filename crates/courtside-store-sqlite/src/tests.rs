//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::NaiveDate;
use courtside_core::{
  Error as CoreError, StandingsEngine,
  game::{GameStatus, NewGame},
  league::{NewSeason, NewTeam, SeasonPatch, TeamPatch},
  record::{HeadToHeadRecord, TeamSeasonRecord},
  roster::{NewPlayer, PlayerPatch, PlayerQuery},
  stats::{BoxScore, NewStatLine, StatLinePatch, StatQuery},
  store::{AggregateStore, FailureKind, GameQuery, LeagueStore, StoreFailure},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, m, d).unwrap() }

async fn team(s: &SqliteStore, name: &str) -> Uuid {
  s.add_team(NewTeam { name: name.into(), logo: None }).await.unwrap().team_id
}

async fn season(s: &SqliteStore, name: &str) -> Uuid {
  s.add_season(NewSeason {
    name:       name.into(),
    start_date: date(1, 1),
    end_date:   date(6, 30),
    is_active:  true,
  })
  .await
  .unwrap()
  .season_id
}

fn new_game(season_id: Uuid, home: Uuid, away: Uuid, played_on: NaiveDate) -> NewGame {
  NewGame {
    season_id,
    home_team_id: home,
    away_team_id: away,
    played_on,
    location: None,
    notes: None,
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_team() {
  let s = store().await;
  let id = team(&s, "Harbor Hawks").await;

  let fetched = s.get_team(id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Harbor Hawks");
  assert!(s.get_team(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_team_name_is_a_conflict() {
  let s = store().await;
  team(&s, "Harbor Hawks").await;
  let err = s
    .add_team(NewTeam { name: "Harbor Hawks".into(), logo: None })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateName(_)));
  assert_eq!(err.kind(), FailureKind::Conflict);
}

#[tokio::test]
async fn list_teams_filters_by_name_substring() {
  let s = store().await;
  team(&s, "Harbor Hawks").await;
  team(&s, "Valley Hawks").await;
  team(&s, "Ridge Rams").await;

  assert_eq!(s.list_teams(None).await.unwrap().len(), 3);
  let hawks = s.list_teams(Some("hawk".into())).await.unwrap();
  assert_eq!(hawks.len(), 2);
  assert!(hawks.iter().all(|t| t.name.contains("Hawks")));
}

#[tokio::test]
async fn season_dates_and_activity() {
  let s = store().await;
  let err = s
    .add_season(NewSeason {
      name:       "Backwards".into(),
      start_date: date(6, 1),
      end_date:   date(1, 1),
      is_active:  true,
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);

  let err = s
    .add_season(NewSeason {
      name:       "One day".into(),
      start_date: date(6, 1),
      end_date:   date(6, 1),
      is_active:  true,
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);
  assert!(s.list_seasons(None).await.unwrap().is_empty());

  let active = season(&s, "2024").await;
  s.add_season(NewSeason {
    name:       "2023".into(),
    start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    end_date:   NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
    is_active:  false,
  })
  .await
  .unwrap();

  let only_active = s.list_seasons(Some(true)).await.unwrap();
  assert_eq!(only_active.len(), 1);
  assert_eq!(only_active[0].season_id, active);
  // Newest first.
  let all = s.list_seasons(None).await.unwrap();
  assert_eq!(all.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["2024", "2023"]);
}

#[tokio::test]
async fn add_game_checks_references() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let home = team(&s, "Harbor Hawks").await;

  let err = s.add_game(new_game(season_id, home, Uuid::new_v4(), date(2, 1))).await.unwrap_err();
  assert!(matches!(err, Error::TeamNotFound(_)));

  let err = s.add_game(new_game(Uuid::new_v4(), home, home, date(2, 1))).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);

  let err = s
    .add_game(new_game(Uuid::new_v4(), home, team(&s, "Ridge Rams").await, date(2, 1)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SeasonNotFound(_)));
}

#[tokio::test]
async fn list_games_filters_and_orders_by_date() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b, c) = (team(&s, "A").await, team(&s, "B").await, team(&s, "C").await);

  let late = s.add_game(new_game(season_id, a, b, date(3, 1))).await.unwrap();
  let early = s.add_game(new_game(season_id, b, c, date(2, 1))).await.unwrap();
  let middle = s.add_game(new_game(season_id, c, a, date(2, 15))).await.unwrap();
  s.finalize_game(middle.game_id, 70, 60).await.unwrap();

  let all = s.list_games(&GameQuery::default()).await.unwrap();
  let ids: Vec<Uuid> = all.iter().map(|g| g.game_id).collect();
  assert_eq!(ids, vec![early.game_id, middle.game_id, late.game_id]);

  let with_a = s.list_games(&GameQuery { team_id: Some(a), ..Default::default() }).await.unwrap();
  assert_eq!(with_a.len(), 2);

  let finals = s
    .list_games(&GameQuery { status: Some(GameStatus::Final), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(finals.len(), 1);
  assert_eq!(finals[0].home_score, Some(70));

  let window = s
    .list_games(&GameQuery {
      date_from: Some(date(2, 10)),
      date_to: Some(date(3, 1)),
      limit: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(window.iter().map(|g| g.game_id).collect::<Vec<_>>(), vec![middle.game_id]);
}

#[tokio::test]
async fn finalize_game_claims_once() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);
  let game = s.add_game(new_game(season_id, a, b, date(2, 1))).await.unwrap();

  let finalized = s.finalize_game(game.game_id, 81, 79).await.unwrap().unwrap();
  assert_eq!(finalized.status, GameStatus::Final);
  assert_eq!((finalized.home_score, finalized.away_score), (Some(81), Some(79)));

  assert!(s.finalize_game(game.game_id, 90, 10).await.unwrap().is_none());
  let stored = s.get_game(game.game_id).await.unwrap().unwrap();
  assert_eq!(stored.home_score, Some(81));

  let err = s.finalize_game(Uuid::new_v4(), 1, 0).await.unwrap_err();
  assert!(matches!(err, Error::GameNotFound(_)));
}

#[tokio::test]
async fn update_game_overwrites_mutable_fields() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);
  let mut game = s.add_game(new_game(season_id, a, b, date(2, 1))).await.unwrap();

  game.status = GameStatus::Postponed;
  game.played_on = date(2, 8);
  game.notes = Some("gym flooded".into());
  let updated = s.update_game(game.clone()).await.unwrap();
  assert_eq!(updated, game);

  game.game_id = Uuid::new_v4();
  assert!(matches!(s.update_game(game).await.unwrap_err(), Error::GameNotFound(_)));
}

#[tokio::test]
async fn add_game_enrolls_both_teams_or_nothing() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);

  s.add_game(new_game(season_id, a, Uuid::new_v4(), date(2, 1))).await.unwrap_err();
  assert!(s.list_games(&GameQuery::default()).await.unwrap().is_empty());
  assert!(s.list_team_seasons_by_season(season_id).await.unwrap().is_empty());

  s.add_game(new_game(season_id, a, b, date(2, 1))).await.unwrap();
  let enrolled = s.list_team_seasons_by_season(season_id).await.unwrap();
  assert_eq!(enrolled, vec![
    TeamSeasonRecord::zeroed(a, season_id),
    TeamSeasonRecord::zeroed(b, season_id),
  ]);

  // A rematch does not enroll anyone twice.
  s.add_game(new_game(season_id, b, a, date(2, 8))).await.unwrap();
  assert_eq!(s.list_team_seasons_by_season(season_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_team_keeps_names_unique() {
  let s = store().await;
  let hawks = team(&s, "Harbor Hawks").await;
  team(&s, "Ridge Rams").await;

  let renamed = s
    .update_team(hawks, TeamPatch { name: Some("  Bay Hawks ".into()), logo: None })
    .await
    .unwrap();
  assert_eq!(renamed.name, "Bay Hawks");
  assert_eq!(s.get_team(hawks).await.unwrap().unwrap(), renamed);

  // Keeping its own name is not a clash.
  s.update_team(hawks, TeamPatch { name: Some("Bay Hawks".into()), logo: None })
    .await
    .unwrap();

  let err = s
    .update_team(hawks, TeamPatch { name: Some("Ridge Rams".into()), logo: None })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateName(_)));

  let err = s.update_team(Uuid::new_v4(), TeamPatch::default()).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::NotFound);
}

#[tokio::test]
async fn update_season_checks_merged_dates() {
  let s = store().await;
  let season_id = season(&s, "2024").await;

  let err = s
    .update_season(season_id, SeasonPatch { end_date: Some(date(1, 1)), ..Default::default() })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);

  let closed = s
    .update_season(season_id, SeasonPatch { is_active: Some(false), ..Default::default() })
    .await
    .unwrap();
  assert!(!closed.is_active);
  assert_eq!(closed.end_date, date(6, 30));
  assert!(s.list_seasons(Some(true)).await.unwrap().is_empty());
}

#[tokio::test]
async fn deletes_are_refused_while_referenced() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);
  let game = s.add_game(new_game(season_id, a, b, date(2, 1))).await.unwrap();

  let err = s.delete_season(season_id).await.unwrap_err();
  assert!(matches!(err, Error::InUse { what: "season", .. }));
  assert_eq!(err.kind(), FailureKind::Conflict);
  let err = s.delete_team(a).await.unwrap_err();
  assert!(matches!(err, Error::InUse { what: "team", .. }));

  s.finalize_game(game.game_id, 70, 60).await.unwrap();
  let err = s.delete_game(game.game_id).await.unwrap_err();
  assert!(matches!(err, Error::InUse { what: "game", .. }));

  let spare = s.add_game(new_game(season_id, b, a, date(3, 1))).await.unwrap();
  s.delete_game(spare.game_id).await.unwrap();
  assert!(s.get_game(spare.game_id).await.unwrap().is_none());
  assert!(matches!(s.delete_game(spare.game_id).await.unwrap_err(), Error::GameNotFound(_)));
}

#[tokio::test]
async fn unused_team_and_season_are_deleted_with_their_rows() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let a = team(&s, "A").await;
  s.get_or_create_team_season(a, season_id).await.unwrap();

  s.delete_team(a).await.unwrap();
  assert!(s.get_team(a).await.unwrap().is_none());
  assert!(s.list_team_seasons_by_season(season_id).await.unwrap().is_empty());

  s.delete_season(season_id).await.unwrap();
  assert!(s.get_season(season_id).await.unwrap().is_none());
  let err = s.delete_season(season_id).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::NotFound);
}

// ─── Rosters and stat lines ──────────────────────────────────────────────────

async fn player(s: &SqliteStore, team_id: Uuid, name: &str, number: u32) -> Uuid {
  s.add_player(NewPlayer {
    team_id,
    name: name.into(),
    jersey_number: Some(number),
    position: Some("G".into()),
  })
  .await
  .unwrap()
  .player_id
}

fn line(game_id: Uuid, player_id: Uuid, box_score: BoxScore) -> NewStatLine {
  NewStatLine { game_id, player_id, box_score }
}

#[tokio::test]
async fn players_belong_to_known_teams() {
  let s = store().await;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);
  let ana = player(&s, a, "Ana Ruiz", 7).await;
  player(&s, a, "Bo Park", 12).await;
  player(&s, b, "Cy Dale", 3).await;

  let err = s
    .add_player(NewPlayer {
      team_id:       Uuid::new_v4(),
      name:          "Nobody".into(),
      jersey_number: None,
      position:      None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TeamNotFound(_)));

  let on_a = s
    .list_players(&PlayerQuery { team_id: Some(a), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(on_a.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["Ana Ruiz", "Bo Park"]);

  let traded = s
    .update_player(ana, PlayerPatch { team_id: Some(b), ..Default::default() })
    .await
    .unwrap();
  assert_eq!((traded.team_id, traded.jersey_number), (b, Some(7)));
  let named = s
    .list_players(&PlayerQuery { name: Some("ruiz".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(named, vec![traded]);

  let err = s
    .update_player(ana, PlayerPatch { team_id: Some(Uuid::new_v4()), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TeamNotFound(_)));

  // A team with players cannot be deleted.
  let err = s.delete_team(a).await.unwrap_err();
  assert!(matches!(err, Error::InUse { what: "team", .. }));
}

#[tokio::test]
async fn stat_lines_derive_points_and_stay_unique() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);
  let ana = player(&s, a, "Ana Ruiz", 7).await;
  let game = s.add_game(new_game(season_id, a, b, date(2, 1))).await.unwrap();

  let shooting = BoxScore {
    minutes_played: Some(31),
    two_pt_made: 6,
    two_pt_attempted: 11,
    three_pt_made: 2,
    three_pt_attempted: 5,
    ft_made: 3,
    ft_attempted: 4,
    rebounds: 8,
    ..BoxScore::default()
  };
  let added = s.add_stat_line(line(game.game_id, ana, shooting)).await.unwrap();
  assert_eq!(added.box_score.points, 21);
  assert_eq!(s.get_stat_line(added.stat_line_id).await.unwrap().unwrap(), added);

  let err = s.add_stat_line(line(game.game_id, ana, shooting)).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateStatLine { .. }));
  assert_eq!(err.kind(), FailureKind::Conflict);

  let bad = BoxScore { ft_made: 5, ft_attempted: 4, ..shooting };
  let err = s.add_stat_line(line(game.game_id, ana, bad)).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);

  let err = s.add_stat_line(line(Uuid::new_v4(), ana, shooting)).await.unwrap_err();
  assert!(matches!(err, Error::GameNotFound(_)));
  let err = s.add_stat_line(line(game.game_id, Uuid::new_v4(), shooting)).await.unwrap_err();
  assert!(matches!(err, Error::PlayerNotFound(_)));

  let updated = s
    .update_stat_line(added.stat_line_id, StatLinePatch {
      three_pt_made: Some(3),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!((updated.box_score.points, updated.box_score.rebounds), (24, 8));
  let stored = s.get_stat_line(added.stat_line_id).await.unwrap().unwrap();
  assert_eq!(stored, updated);

  let err = s
    .update_stat_line(added.stat_line_id, StatLinePatch {
      two_pt_attempted: Some(2),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);

  // Lines pin both the game and the player.
  assert!(matches!(s.delete_game(game.game_id).await.unwrap_err(), Error::InUse { .. }));
  assert!(matches!(s.delete_player(ana).await.unwrap_err(), Error::InUse { .. }));

  s.delete_stat_line(added.stat_line_id).await.unwrap();
  assert!(s.get_stat_line(added.stat_line_id).await.unwrap().is_none());
  s.delete_player(ana).await.unwrap();
  let err = s.delete_stat_line(added.stat_line_id).await.unwrap_err();
  assert!(matches!(err, Error::StatLineNotFound(_)));
}

#[tokio::test]
async fn stat_lines_filter_by_player_game_and_season() {
  let s = store().await;
  let this_season = season(&s, "2024").await;
  let last_season = s
    .add_season(NewSeason {
      name:       "2023".into(),
      start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
      end_date:   NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
      is_active:  false,
    })
    .await
    .unwrap()
    .season_id;
  let (a, b) = (team(&s, "A").await, team(&s, "B").await);
  let (ana, cy) = (player(&s, a, "Ana Ruiz", 7).await, player(&s, b, "Cy Dale", 3).await);

  let old = s
    .add_game(new_game(last_season, a, b, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()))
    .await
    .unwrap();
  let new = s.add_game(new_game(this_season, a, b, date(3, 1))).await.unwrap();
  for (game_id, player_id) in [(old.game_id, ana), (new.game_id, ana), (new.game_id, cy)] {
    s.add_stat_line(line(game_id, player_id, BoxScore { points: 10, ..Default::default() }))
      .await
      .unwrap();
  }

  let count = |q: StatQuery| {
    let s = s.clone();
    async move { s.list_stat_lines(&q).await.unwrap().len() }
  };
  assert_eq!(count(StatQuery::default()).await, 3);
  assert_eq!(count(StatQuery { player_id: Some(ana), ..Default::default() }).await, 2);
  assert_eq!(count(StatQuery { game_id: Some(new.game_id), ..Default::default() }).await, 2);
  assert_eq!(
    count(StatQuery { player_id: Some(ana), season_id: Some(this_season), ..Default::default() })
      .await,
    1
  );
  assert_eq!(count(StatQuery { limit: Some(1), offset: Some(2), ..Default::default() }).await, 1);
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_is_zeroed_and_stable() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let a = team(&s, "A").await;

  let first = s.get_or_create_team_season(a, season_id).await.unwrap();
  assert_eq!(first, TeamSeasonRecord::zeroed(a, season_id));
  let again = s.get_or_create_team_season(a, season_id).await.unwrap();
  assert_eq!(again, first);
  assert_eq!(s.list_team_seasons_by_season(season_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_keys_are_not_found() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let a = team(&s, "A").await;

  let err = s.get_or_create_team_season(Uuid::new_v4(), season_id).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::NotFound);
  let err = s.get_or_create_team_season(a, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::SeasonNotFound(_)));
  let err = s.get_or_create_head_to_head(season_id, a, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::TeamNotFound(_)));
}

#[tokio::test]
async fn upsert_checks_versions() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let a = team(&s, "A").await;

  let zero = s.get_or_create_team_season(a, season_id).await.unwrap();
  let one = s.upsert_team_season(zero.after_win(90, 80)).await.unwrap();
  assert_eq!(one.version, 1);

  // A second writer still holding version 0 loses.
  let err = s.upsert_team_season(zero.after_loss(70, 75)).await.unwrap_err();
  assert!(matches!(err, Error::StaleVersion { expected: 0, .. }));
  assert_eq!(err.kind(), FailureKind::Conflict);

  let stored = s.get_or_create_team_season(a, season_id).await.unwrap();
  assert_eq!((stored.wins, stored.losses, stored.version), (1, 0, 1));
}

#[tokio::test]
async fn head_to_head_upsert_and_list() {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let (a, b, c) = (team(&s, "A").await, team(&s, "B").await, team(&s, "C").await);

  s.upsert_head_to_head(HeadToHeadRecord::zeroed(season_id, a, b).after_win(80, 70))
    .await
    .unwrap();
  s.upsert_head_to_head(HeadToHeadRecord::zeroed(season_id, a, c).after_loss(60, 65))
    .await
    .unwrap();
  s.upsert_head_to_head(HeadToHeadRecord::zeroed(season_id, b, a).after_loss(70, 80))
    .await
    .unwrap();

  let rows = s.list_head_to_head_by_team(season_id, a).await.unwrap();
  assert_eq!(rows.iter().map(|r| r.opponent_id).collect::<Vec<_>>(), vec![b, c]);
  assert!(rows.iter().all(|r| r.version == 1));

  let err = s.upsert_head_to_head(HeadToHeadRecord::zeroed(season_id, a, a)).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::Rejected);
}

// ─── Engine over SQLite ──────────────────────────────────────────────────────

struct Fixture {
  engine: StandingsEngine<SqliteStore>,
  season: Uuid,
  teams:  Vec<Uuid>,
}

async fn fixture(names: &[&str]) -> Fixture {
  let s = store().await;
  let season_id = season(&s, "2024").await;
  let mut teams = Vec::new();
  for name in names {
    teams.push(team(&s, name).await);
  }
  Fixture { engine: StandingsEngine::new(Arc::new(s)), season: season_id, teams }
}

impl Fixture {
  /// Schedule and finalize a game, then feed it to the engine.
  async fn play(&self, home: usize, away: usize, home_score: u32, away_score: u32) {
    let store = self.engine.store();
    let game = store
      .add_game(new_game(self.season, self.teams[home], self.teams[away], date(2, 1)))
      .await
      .unwrap();
    let game = store.finalize_game(game.game_id, home_score, away_score).await.unwrap().unwrap();
    self.engine.apply_finalized_game(&game.result()).await.unwrap();
  }
}

#[tokio::test]
async fn ingestion_writes_all_four_rows() {
  let f = fixture(&["A", "B"]).await;
  f.play(0, 1, 95, 90).await;

  let store = f.engine.store();
  let a = store.get_or_create_team_season(f.teams[0], f.season).await.unwrap();
  let b = store.get_or_create_team_season(f.teams[1], f.season).await.unwrap();
  assert_eq!((a.wins, a.points_for, a.points_against, a.streak, a.version), (1, 95, 90, 1, 1));
  assert_eq!((b.losses, b.points_for, b.streak), (1, 90, -1));

  let ab = f.engine.head_to_head(f.season, f.teams[0], f.teams[1]).await.unwrap();
  let ba = f.engine.head_to_head(f.season, f.teams[1], f.teams[0]).await.unwrap();
  assert_eq!((ab.wins, ab.losses, ba.wins, ba.losses), (1, 0, 0, 1));
  assert_eq!(ab.points_for, ba.points_against);
}

#[tokio::test]
async fn standings_rank_through_the_full_cascade() {
  // A, B, C cycle head-to-head and all beat D.
  let f = fixture(&["A", "B", "C", "D"]).await;
  f.play(0, 1, 80, 70).await;
  f.play(1, 2, 80, 75).await;
  f.play(2, 0, 80, 78).await;
  f.play(0, 3, 90, 60).await;
  f.play(1, 3, 90, 70).await;
  f.play(2, 3, 90, 65).await;

  let standings = f.engine.rank_standings(f.season).await.unwrap();
  let order: Vec<Uuid> = standings.iter().map(|e| e.record.team_id).collect();
  assert_eq!(order, vec![f.teams[0], f.teams[2], f.teams[1], f.teams[3]]);
  assert_eq!(standings[0].rank, 1);
  assert_eq!(standings[3].win_pct, 0.0);
  assert_eq!(standings[0].point_differential, 248 - 210);
}

#[tokio::test]
async fn enrolled_teams_rank_in_enrollment_order() {
  let f = fixture(&["A", "B", "C"]).await;
  for &t in f.teams.iter().rev() {
    f.engine.enroll_team(f.season, t).await.unwrap();
  }
  let order: Vec<Uuid> = f
    .engine
    .rank_standings(f.season)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.record.team_id)
    .collect();
  assert_eq!(order, f.teams.iter().rev().copied().collect::<Vec<_>>());
}

#[tokio::test]
async fn concurrent_games_in_one_season_are_all_counted() {
  let f = Arc::new(fixture(&["A", "B", "C"]).await);
  let tasks: Vec<_> = (0..12)
    .map(|i| {
      let f = Arc::clone(&f);
      tokio::spawn(async move { f.play(i % 3, (i + 1) % 3, 100, 90).await })
    })
    .collect();
  for task in tasks {
    task.await.unwrap();
  }

  let standings = f.engine.rank_standings(f.season).await.unwrap();
  let games: u32 = standings.iter().map(|e| e.record.games()).sum();
  assert_eq!(games, 24);
  assert!(standings.iter().all(|e| e.record.wins == 4 && e.record.losses == 4));
}

#[tokio::test]
async fn ranking_an_unknown_season_is_not_found() {
  let f = fixture(&["A"]).await;
  let err = f.engine.rank_standings(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound(_)));
}
