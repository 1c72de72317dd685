//! Pure game logic for the trial investment game.
//!
//! Teams run a small drug development portfolio. Each round they pay for
//! consultant opinions on one candidate, decide whether to invest in its
//! trial, and the operator rolls a single shared outcome. This crate holds
//! everything that is independent of the database: functions take plain
//! data and return results, so they run unchanged inside the SpacetimeDB
//! module (WASM), the native simtest harness and unit tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Round definitions, built-in scenarios, config validation |
//! | [`errors`] | Rejection reasons for operator and team actions |
//! | [`phase`] | Five-phase round state machine and reveal flags |
//! | [`probability_line`] | 0–100 axis layout for the expert summary |
//! | [`session`] | In-memory single-writer game session |
//! | [`settlement`] | Average probability, shared roll, per-team profit |
//! | [`standings`] | Leaderboard ordering and submission counters |
//! | [`team`] | Team records, decisions, revealed opinions |

pub mod config;
pub mod errors;
pub mod phase;
pub mod probability_line;
pub mod session;
pub mod settlement;
pub mod standings;
pub mod team;
