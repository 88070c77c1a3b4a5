//! Tournament data models.

use serde::{Deserialize, Serialize};

use super::rules::Rules;

/// Tournament ID type
pub type TournamentId = i64;

/// Participant ID type (players, creators and platform roles alike)
pub type PlayerId = i64;

/// Token amount in base units
pub type Amount = u128;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Tournament status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting joins and withdrawals
    #[default]
    Open,
    /// `max_players` reached; withdrawals only
    Locked,
    /// Start conditions being evaluated (never persisted)
    PendingStart,
    /// Game in progress
    Active,
    /// Finished normally; settlement phase
    Ended,
    /// Start conditions unmet or emergency cancel; refunds only
    Cancelled,
}

impl TournamentStatus {
    /// Whether no further status transition can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Open => write!(f, "open"),
            TournamentStatus::Locked => write!(f, "locked"),
            TournamentStatus::PendingStart => write!(f, "pending_start"),
            TournamentStatus::Active => write!(f, "active"),
            TournamentStatus::Ended => write!(f, "ended"),
            TournamentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Participant status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Staked and playing
    Active,
    /// Met the exit condition; winner awaiting prize
    Exited,
    /// Left mid-tournament with a partial refund
    Forfeited,
    /// Winner who collected their share
    PrizeClaimed,
    /// Stake returned in full
    Refunded,
}

impl PlayerStatus {
    /// Whether the player belongs to the winner set
    pub fn is_winner(self) -> bool {
        matches!(self, Self::Exited | Self::PrizeClaimed)
    }

    /// Whether moving from `self` to `next` is a legal record transition
    pub fn can_transition_to(self, next: PlayerStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Exited)
                | (Self::Active, Self::Forfeited)
                | (Self::Active, Self::Refunded)
                | (Self::Exited, Self::PrizeClaimed)
        )
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Active => write!(f, "active"),
            PlayerStatus::Exited => write!(f, "exited"),
            PlayerStatus::Forfeited => write!(f, "forfeited"),
            PlayerStatus::PrizeClaimed => write!(f, "prize_claimed"),
            PlayerStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// Per-participant stake record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub stake_amount: Amount,
    pub status: PlayerStatus,
    pub joined_at: Timestamp,
}

/// Mutable aggregate state of a tournament
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentState {
    pub status: TournamentStatus,
    /// Participants counted towards the fee base (forfeits stay counted)
    pub player_count: u32,
    /// Cumulative stake ever deposited
    pub total_pool_amount: Amount,
    /// Stake still refundable or at risk
    pub active_stake_sum: Amount,
    /// Withdrawal and forfeit refunds paid out
    pub refunded_amount: Amount,
    /// Prizes paid out
    pub prizes_paid: Amount,
    /// Creator and platform fees paid out
    pub fees_paid: Amount,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub creator_fee_collected: bool,
    pub platform_fee_collected: bool,
}

/// A status change performed by the lifecycle state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: TournamentStatus,
    pub to: TournamentStatus,
}

impl std::fmt::Display for StatusTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Status right after an operation that may move the state machine,
/// together with the move it made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub status: TournamentStatus,
    pub transition: Option<StatusTransition>,
}

/// Outcome of a settlement payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: PlayerId,
    pub amount: Amount,
}

/// Settlement figures as of now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizePreview {
    pub settlement_pool: Amount,
    pub creator_fee: Amount,
    pub platform_fee: Amount,
    pub winner_count: usize,
    pub prize_per_winner: Amount,
    pub unclaimed_remainder: Amount,
}

/// Read-only tournament snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentInfo {
    pub id: TournamentId,
    pub rules: Rules,
    pub creator: PlayerId,
    pub state: TournamentState,
    pub winner_count: usize,
    /// Escrowed amount according to the engine's own accounting
    pub escrow_balance: Amount,
}
