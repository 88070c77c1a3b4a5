//! # Stake Arena
//!
//! A staked, multi-player elimination tournament engine.
//!
//! Players escrow a stake to join, compete for a fixed duration, and leave
//! either as winners (exit), with a partial refund (forfeit), or with a full
//! refund before start (withdraw). After the tournament ends the pool is
//! split among winners once creator and platform fees are taken.
//!
//! ## Architecture
//!
//! A tournament moves through these statuses:
//!
//! - **Open**: Accepting joins and withdrawals
//! - **Locked**: Full; withdrawals only
//! - **PendingStart**: Start conditions being checked (transient)
//! - **Active**: Running; forfeit and exit only
//! - **Ended**: Settlement phase; prizes and fees
//! - **Cancelled**: Start conditions unmet or emergency cancel; refunds only
//!
//! Transitions happen on [`Tournament::evaluate`], driven by a caller-supplied
//! clock, or synchronously when a join fills the tournament.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Rules, state machine, stake ledger, penalties, settlement
//! - [`wallet`]: Token custody and the escrow transfer primitive
//! - [`standings`]: Combat outcomes consumed for exit eligibility
//! - [`auth`]: Access tokens identifying callers

/// Signed access tokens.
pub mod auth;

/// Combat-reported player standings.
pub mod standings;

/// Tournament lifecycle and settlement engine.
pub mod tournament;
pub use tournament::{
    Amount, PlayerId, Rules, Timestamp, Tournament, TournamentError, TournamentId,
    TournamentManager, TournamentResult, TournamentStatus,
};

/// Wallets, escrow and the transaction ledger.
pub mod wallet;
