//! Player standings reported by the combat service.
//!
//! Combat resolution happens elsewhere. This module only records the
//! outcomes it reports (lives, coins, secret objectives) so the tournament
//! engine can decide whether a player may exit as a winner.

pub mod models;
pub mod oracle;

pub use models::{PlayerStanding, StandingDelta};
pub use oracle::{StandingBook, StandingOracle};
