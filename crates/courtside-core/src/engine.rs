//! [`StandingsEngine`] drives ingestion and ranking against a store.
//!
//! The engine holds no aggregate state of its own. It owns one async mutex
//! per season so that read-modify-write ingestion is serialised within a
//! season while different seasons proceed in parallel. Writers in other
//! processes are caught by the store's version checks and retried with
//! backoff.
//!
//! Nothing here spawns tasks: dropping a returned future cancels the store
//! call in flight, so callers' timeouts apply unchanged.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use backon::{ExponentialBuilder, Retryable as _};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  game::GameResult,
  ingest::{GameTally, tally},
  record::{HeadToHeadRecord, TeamSeasonRecord},
  standings::{StandingsEntry, group_by_win_pct, into_entries, tier_pct},
  store::{AggregateStore, FailureKind, StoreFailure},
  tiebreak::{HeadToHeadTable, resolve},
};

// ─── Retry policy ────────────────────────────────────────────────────────────

/// Backoff applied when a commit loses an optimistic version check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts, including the first.
  pub max_attempts: usize,
  pub min_delay:    Duration,
  pub max_delay:    Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 5,
      min_delay:    Duration::from_millis(10),
      max_delay:    Duration::from_millis(500),
    }
  }
}

impl RetryPolicy {
  fn backoff(&self) -> ExponentialBuilder {
    ExponentialBuilder::default()
      .with_min_delay(self.min_delay)
      .with_max_delay(self.max_delay)
      .with_max_times(self.max_attempts.saturating_sub(1))
      .with_jitter()
  }
}

// ─── Season locks ────────────────────────────────────────────────────────────

#[derive(Default)]
struct SeasonLocks {
  inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl SeasonLocks {
  fn for_season(&self, season_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
    let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    map.entry(season_id).or_default().clone()
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Ingests finalized games and ranks seasons on top of an [`AggregateStore`].
pub struct StandingsEngine<S> {
  store: Arc<S>,
  locks: SeasonLocks,
  retry: RetryPolicy,
}

impl<S: AggregateStore> StandingsEngine<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, locks: SeasonLocks::default(), retry: RetryPolicy::default() }
  }

  pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Fold one finalized game into the season and head-to-head aggregates.
  ///
  /// Not idempotent: applying the same game twice counts it twice. The four
  /// rows are committed together or not at all. Returns the rows as written.
  pub async fn apply_finalized_game(&self, game: &GameResult) -> Result<GameTally> {
    let score = game
      .decide()
      .map_err(|reason| Error::InvalidInput { game_id: game.game_id, reason })?;

    let lock = self.locks.for_season(game.season_id);
    let _guard = lock.lock().await;

    let attempt = || async move {
      let current = self.load_tally(game).await?;
      debug_assert!(current.matches(game));
      self
        .store
        .commit_tally(tally(score, current))
        .await
        .map_err(|e| store_error(e, game.season_id))
    };

    let written = attempt
      .retry(self.retry.backoff())
      .sleep(tokio::time::sleep)
      .when(Error::is_conflict)
      .notify(|err, delay| {
        warn!(game_id = %game.game_id, ?delay, "retrying ingestion: {err}");
      })
      .await?;

    debug!(
      game_id = %game.game_id,
      season_id = %game.season_id,
      home = %game.home_team_id,
      away = %game.away_team_id,
      "applied finalized game"
    );
    Ok(written)
  }

  async fn load_tally(&self, game: &GameResult) -> Result<GameTally> {
    let season = game.season_id;
    let (home, away) = (game.home_team_id, game.away_team_id);
    let store = &self.store;

    let (home_rec, away_rec, home_vs_away, away_vs_home) = tokio::try_join!(
      store.get_or_create_team_season(home, season),
      store.get_or_create_team_season(away, season),
      store.get_or_create_head_to_head(season, home, away),
      store.get_or_create_head_to_head(season, away, home),
    )
    .map_err(|e| store_error(e, season))?;

    Ok(GameTally { home: home_rec, away: away_rec, home_vs_away, away_vs_home })
  }

  /// Make sure a team has a (possibly zeroed) record in a season, so it
  /// appears in the standings before its first game.
  pub async fn enroll_team(&self, season_id: Uuid, team_id: Uuid) -> Result<TeamSeasonRecord> {
    self
      .store
      .get_or_create_team_season(team_id, season_id)
      .await
      .map_err(|e| store_error(e, season_id))
  }

  // ── Ranking ───────────────────────────────────────────────────────────

  /// Rank every team in the season, best first.
  ///
  /// Any read failure aborts the whole computation.
  pub async fn rank_standings(&self, season_id: Uuid) -> Result<Vec<StandingsEntry>> {
    let records = self
      .store
      .list_team_seasons_by_season(season_id)
      .await
      .map_err(|e| store_error(e, season_id))?;

    let team_count = records.len();
    let mut ordered = Vec::with_capacity(team_count);
    for tier in group_by_win_pct(records) {
      if tier.len() == 1 {
        ordered.extend(tier);
        continue;
      }
      debug!(
        %season_id,
        teams = tier.len(),
        win_pct = tier_pct(&tier).as_f64(),
        "resolving tie"
      );
      let table = self.head_to_head_among(season_id, &tier).await?;
      ordered.extend(resolve(tier, &table));
    }

    info!(%season_id, teams = team_count, "ranked standings");
    Ok(into_entries(ordered))
  }

  async fn head_to_head_among(
    &self,
    season_id: Uuid,
    tier: &[TeamSeasonRecord],
  ) -> Result<HeadToHeadTable> {
    let mut table = HeadToHeadTable::new();
    for member in tier {
      let rows = self
        .store
        .list_head_to_head_by_team(season_id, member.team_id)
        .await
        .map_err(|e| store_error(e, season_id))?;
      rows.into_iter().for_each(|row| table.insert(row));
    }
    Ok(table)
  }

  /// `team_id`'s record against `opponent_id`.
  ///
  /// Read-only: teams that have not met get a zeroed record that is never
  /// written to the store.
  pub async fn head_to_head(
    &self,
    season_id: Uuid,
    team_id: Uuid,
    opponent_id: Uuid,
  ) -> Result<HeadToHeadRecord> {
    let rows = self
      .store
      .list_head_to_head_by_team(season_id, team_id)
      .await
      .map_err(|e| store_error(e, season_id))?;
    Ok(
      rows
        .into_iter()
        .find(|row| row.opponent_id == opponent_id)
        .unwrap_or_else(|| HeadToHeadRecord::zeroed(season_id, team_id, opponent_id)),
    )
  }
}

fn store_error<E: StoreFailure>(err: E, season_id: Uuid) -> Error {
  match err.kind() {
    FailureKind::NotFound => Error::NotFound(err.to_string()),
    FailureKind::Conflict => Error::ConcurrencyConflict { season_id },
    FailureKind::Rejected => Error::Rejected(err.to_string()),
    FailureKind::Unavailable => Error::StoreUnavailable(Box::new(err)),
  }
}
