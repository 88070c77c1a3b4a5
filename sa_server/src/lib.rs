//! HTTP server for the staked tournament engine.
//!
//! Exposes [`stake_arena`] over JSON/HTTP and drives tournament transitions
//! with a background evaluator.

pub mod api;
pub mod config;
pub mod evaluator;
pub mod logging;
pub mod metrics;
