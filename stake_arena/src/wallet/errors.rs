//! Wallet error types.

use thiserror::Error;

use crate::tournament::models::{Amount, PlayerId, TournamentId};

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Insufficient balance
    #[error("Insufficient balance for user {user_id}: available {available}, required {required}")]
    InsufficientBalance {
        user_id: PlayerId,
        available: Amount,
        required: Amount,
    },

    /// Wallet not found
    #[error("Wallet not found for user {0}")]
    WalletNotFound(PlayerId),

    /// Escrow not found
    #[error("Escrow not found for tournament {0}")]
    EscrowNotFound(TournamentId),

    /// Escrow holds less than the requested payout
    #[error("Escrow for tournament {tournament_id} holds {available}, required {required}")]
    EscrowUnderfunded {
        tournament_id: TournamentId,
        available: Amount,
        required: Amount,
    },

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    /// Balance would overflow
    #[error("Balance overflow")]
    Overflow,

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// User IDs and tournament IDs are redacted.
    pub fn client_message(&self) -> String {
        match self {
            WalletError::InsufficientBalance { .. } => "Insufficient balance".to_string(),
            WalletError::WalletNotFound(_) => "Wallet not found".to_string(),
            WalletError::EscrowNotFound(_) | WalletError::EscrowUnderfunded { .. } => {
                "Escrow unavailable".to_string()
            }
            WalletError::TransactionFailed(_) | WalletError::Overflow => {
                "Internal server error".to_string()
            }
            WalletError::InvalidAmount(_) => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
