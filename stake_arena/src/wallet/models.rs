//! Wallet data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tournament::models::{Amount, PlayerId, TournamentId};

/// Wallet model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: PlayerId,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tournament escrow model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentEscrow {
    pub tournament_id: TournamentId,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wallet entry model (double-entry ledger)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: i64,
    pub user_id: PlayerId,
    pub tournament_id: Option<TournamentId>,
    pub amount: Amount,
    pub balance_after: Amount,
    pub direction: EntryDirection,
    pub entry_type: EntryType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry direction, seen from the user's wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl std::fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryDirection::Debit => write!(f, "debit"),
            EntryDirection::Credit => write!(f, "credit"),
        }
    }
}

/// Entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// External funding of a wallet
    Deposit,
    /// Stake escrowed on join
    Stake,
    /// Full stake returned (withdrawal or cancellation)
    Refund,
    /// Partial stake returned after forfeit
    ForfeitRefund,
    /// Winner's prize share
    Prize,
    CreatorFee,
    PlatformFee,
}

impl EntryType {
    /// Whether this entry moves funds out of a tournament escrow
    pub fn is_payout(self) -> bool {
        !matches!(self, EntryType::Deposit | EntryType::Stake)
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Deposit => write!(f, "deposit"),
            EntryType::Stake => write!(f, "stake"),
            EntryType::Refund => write!(f, "refund"),
            EntryType::ForfeitRefund => write!(f, "forfeit_refund"),
            EntryType::Prize => write!(f, "prize"),
            EntryType::CreatorFee => write!(f, "creator_fee"),
            EntryType::PlatformFee => write!(f, "platform_fee"),
        }
    }
}
