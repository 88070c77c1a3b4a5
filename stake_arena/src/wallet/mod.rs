//! Wallet module providing token custody with double-entry ledger and escrow.
//!
//! This module implements:
//! - Double-entry ledger for all wallet transactions
//! - Tournament escrow (stakes locked while a tournament runs)
//! - All-or-nothing transfers behind the [`Escrow`] trait
//!
//! ## Example
//!
//! ```
//! use stake_arena::wallet::{EntryType, WalletManager};
//!
//! let wallets = WalletManager::new();
//! wallets.deposit(1, 500).unwrap();
//!
//! // Stake into tournament 7
//! let balance = wallets
//!     .transfer_to_escrow(1, 7, 200, EntryType::Stake)
//!     .unwrap();
//! assert_eq!(balance, 300);
//! ```

pub mod errors;
pub mod escrow;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use escrow::Escrow;
pub use manager::WalletManager;
pub use models::{EntryDirection, EntryType, TournamentEscrow, Wallet, WalletEntry};
