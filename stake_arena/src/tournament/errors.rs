//! Tournament error types.

use thiserror::Error;

use super::models::{Amount, PlayerId, PlayerStatus, TournamentId, TournamentStatus};
use crate::wallet::WalletError;

/// Broad error category, used by callers to decide how to surface a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation illegal in the current status
    State,
    /// Rejected input
    Validation,
    /// Caller lacks the required role or record state
    Authorization,
    /// Operation already completed
    Idempotency,
    /// Unknown tournament or player
    NotFound,
    /// Token transfer failed
    Escrow,
    /// Accounting overflow
    Internal,
}

/// Unmet exit condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitBlock {
    /// Too few lives and no completed objective
    Lives { lives: u32, required: u32 },
    /// Not enough coins to pay the exit cost
    Coins { coins: u64, cost: Amount },
}

impl std::fmt::Display for ExitBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitBlock::Lives { lives, required } => {
                write!(f, "{lives} lives, {required} required")
            }
            ExitBlock::Coins { coins, cost } => write!(f, "{coins} coins, exit costs {cost}"),
        }
    }
}

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Operation not allowed while tournament is {actual}")]
    InvalidStatus { actual: TournamentStatus },

    #[error("Cannot refund after tournament started")]
    CannotRefundAfterStart,

    #[error("Exit conditions not met: {0}")]
    CannotExit(ExitBlock),

    #[error("Forfeiting is not allowed in this tournament")]
    ForfeitNotAllowed,

    #[error("Player {player_id} cannot go from {from} to {to}")]
    InvalidPlayerState {
        player_id: PlayerId,
        from: PlayerStatus,
        to: PlayerStatus,
    },

    #[error("Stake too low: minimum {min}, got {got}")]
    StakeTooLow { min: Amount, got: Amount },

    #[error("Stake too high: maximum {max}, got {got}")]
    StakeTooHigh { max: Amount, got: Amount },

    #[error("Invalid rules: {field} {reason}")]
    InvalidRules { field: String, reason: String },

    #[error("Player already joined: {0}")]
    AlreadyJoined(PlayerId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} is not a winner")]
    NotWinner(PlayerId),

    #[error("Caller {0} is not authorized")]
    Unauthorized(PlayerId),

    #[error("Prize already claimed by player {0}")]
    AlreadyClaimed(PlayerId),

    #[error("Fees already collected")]
    AlreadyCollected,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Escrow transfer failed: {0}")]
    Escrow(#[from] WalletError),
}

impl TournamentError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::InvalidStatus { .. }
            | TournamentError::CannotRefundAfterStart
            | TournamentError::CannotExit(_)
            | TournamentError::ForfeitNotAllowed
            | TournamentError::InvalidPlayerState { .. } => ErrorKind::State,
            TournamentError::StakeTooLow { .. }
            | TournamentError::StakeTooHigh { .. }
            | TournamentError::InvalidRules { .. }
            | TournamentError::AlreadyJoined(_) => ErrorKind::Validation,
            TournamentError::NotWinner(_) | TournamentError::Unauthorized(_) => {
                ErrorKind::Authorization
            }
            TournamentError::AlreadyClaimed(_) | TournamentError::AlreadyCollected => {
                ErrorKind::Idempotency
            }
            TournamentError::NotFound(_) | TournamentError::PlayerNotFound(_) => {
                ErrorKind::NotFound
            }
            TournamentError::Escrow(_) => ErrorKind::Escrow,
            TournamentError::ArithmeticOverflow => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message
    ///
    /// Escrow failures and overflows are reported generically; everything
    /// else describes the caller's own request and is safe to expose.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Escrow(e) => e.client_message(),
            TournamentError::ArithmeticOverflow => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            TournamentError::InvalidStatus {
                actual: TournamentStatus::Active
            }
            .kind(),
            ErrorKind::State
        );
        assert_eq!(
            TournamentError::StakeTooLow { min: 10, got: 1 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(TournamentError::NotWinner(1).kind(), ErrorKind::Authorization);
        assert_eq!(TournamentError::AlreadyCollected.kind(), ErrorKind::Idempotency);
        assert_eq!(TournamentError::NotFound(7).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_client_message_hides_escrow_details() {
        let err = TournamentError::from(WalletError::EscrowNotFound(42));
        assert_eq!(err.kind(), ErrorKind::Escrow);
        assert!(!err.client_message().contains("42"));
    }

    #[test]
    fn test_display() {
        let err = TournamentError::CannotExit(ExitBlock::Lives {
            lives: 2,
            required: 3,
        });
        assert_eq!(err.to_string(), "Exit conditions not met: 2 lives, 3 required");

        let err = TournamentError::CannotExit(ExitBlock::Coins {
            coins: 40,
            cost: 100,
        });
        assert_eq!(err.to_string(), "Exit conditions not met: 40 coins, exit costs 100");
        assert_eq!(err.kind(), ErrorKind::State);
    }
}
