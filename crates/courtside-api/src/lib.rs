//! JSON REST API for Courtside.
//!
//! Exposes an axum [`Router`] backed by a [`StandingsEngine`] over any
//! [`courtside_core::store::LeagueStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", courtside_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod games;
pub mod players;
pub mod seasons;
pub mod stats;
pub mod teams;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use courtside_core::{StandingsEngine, store::LeagueStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<StandingsEngine<S>>) -> Router<()>
where
  S: LeagueStore + 'static,
{
  Router::new()
    // Teams
    .route("/teams", get(teams::list::<S>).post(teams::create::<S>))
    .route(
      "/teams/{id}",
      get(teams::get_one::<S>).put(teams::update::<S>).delete(teams::delete::<S>),
    )
    .route("/teams/{id}/players", get(teams::players::<S>))
    // Seasons
    .route("/seasons", get(seasons::list::<S>).post(seasons::create::<S>))
    .route(
      "/seasons/{id}",
      get(seasons::get_one::<S>).put(seasons::update::<S>).delete(seasons::delete::<S>),
    )
    .route("/seasons/{id}/standings", get(seasons::standings::<S>))
    .route(
      "/seasons/{id}/head-to-head/{team}/{opponent}",
      get(seasons::head_to_head::<S>),
    )
    // Games
    .route("/games", get(games::list::<S>).post(games::create::<S>))
    .route(
      "/games/{id}",
      get(games::get_one::<S>).put(games::update::<S>).delete(games::delete::<S>),
    )
    .route("/games/{id}/final", post(games::finalize::<S>))
    .route("/games/{id}/status", post(games::set_status::<S>))
    .route("/games/{id}/stats", get(games::stats::<S>))
    // Players
    .route("/players", get(players::list::<S>).post(players::create::<S>))
    .route(
      "/players/{id}",
      get(players::get_one::<S>).put(players::update::<S>).delete(players::delete::<S>),
    )
    .route("/players/{id}/stats", get(players::stats::<S>))
    // Box scores
    .route("/stats", get(stats::list::<S>).post(stats::create::<S>))
    .route(
      "/stats/{id}",
      get(stats::get_one::<S>).put(stats::update::<S>).delete(stats::delete::<S>),
    )
    .with_state(engine)
}
