//! Core types and the standings engine for the Courtside league tracker.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement the traits in [`store`]; higher layers drive the
//! [`engine::StandingsEngine`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod game;
pub mod ingest;
pub mod league;
pub mod record;
pub mod roster;
pub mod standings;
pub mod stats;
pub mod store;
pub mod tiebreak;

pub use engine::{RetryPolicy, StandingsEngine};
pub use error::{Error, InvalidGame, InvalidStatLine, Result};
