//! Staked tournament engine.
//!
//! Players stake tokens to join, compete over a fixed duration, and either
//! exit as winners, forfeit for a partial refund, or withdraw before start.
//! Once the tournament ends, winners split the pool after creator and
//! platform fees.
//!
//! ## Example
//!
//! ```
//! use stake_arena::standings::PlayerStanding;
//! use stake_arena::tournament::{Rules, Tournament, TournamentStatus};
//! use stake_arena::wallet::WalletManager;
//!
//! let wallets = WalletManager::new();
//! wallets.deposit(1, 100).unwrap();
//! wallets.deposit(2, 100).unwrap();
//!
//! let mut rules = Rules::standard("USDC", 1_000);
//! rules.max_stake = 100;
//! let mut tournament = Tournament::new(1, rules, 50, 60, 60).unwrap();
//! tournament.join(1, 100, 0, &wallets).unwrap();
//! tournament.join(2, 100, 0, &wallets).unwrap();
//!
//! tournament.evaluate(1_000).unwrap();
//! assert_eq!(tournament.status(), TournamentStatus::Active);
//!
//! tournament.exit(1, &PlayerStanding::new(5, 0), 1_000).unwrap();
//! tournament.evaluate(1_000 + 3_600).unwrap();
//!
//! let prize = tournament.claim_prize(1, &wallets).unwrap();
//! assert_eq!(prize.amount, 194);
//! ```

pub mod errors;
pub mod instance;
pub mod ledger;
pub mod lifecycle;
pub mod manager;
pub mod models;
pub mod penalty;
pub mod rules;
pub mod settlement;

pub use errors::{ErrorKind, ExitBlock, TournamentError, TournamentResult};
pub use instance::Tournament;
pub use ledger::Withdrawal;
pub use manager::TournamentManager;
pub use models::{
    Amount, Payout, PlayerId, PlayerRecord, PlayerStatus, PrizePreview, StatusTransition,
    Timestamp, TournamentId, TournamentInfo, TournamentState, TournamentStatus,
    TransitionOutcome,
};
pub use penalty::PenaltyRate;
pub use rules::{ForfeitPenaltyType, ForfeitRules, Rules};
