//! Immutable tournament parameters and their validation.

use serde::{Deserialize, Serialize};

use super::errors::{TournamentError, TournamentResult};
use super::models::{Amount, Timestamp};
use super::penalty::BPS_SCALE;

/// Upper bound on `max_players`
pub const MAX_PLAYERS_LIMIT: u32 = 10_000;
/// Upper bound on `creator_fee_percent`
pub const MAX_CREATOR_FEE_PERCENT: u8 = 5;
/// Upper bound on `platform_fee_percent`
pub const MAX_PLATFORM_FEE_PERCENT: u8 = 5;
/// Upper bound on `creator_fee_percent + platform_fee_percent`
pub const MAX_COMBINED_FEE_PERCENT: u8 = 10;
/// Game rounds that must fit into `duration`
pub const MIN_INTERVALS_REQUIRED: u64 = 3;
/// Upper bound on both exit cost rates, in basis points
pub const MAX_EXIT_COST_BPS: u32 = 10_000;
/// Upper bound on `cards_per_type`
pub const MAX_CARDS_PER_TYPE: u32 = 10;
/// Penalties are expressed as whole percentages of the stake
pub const MAX_PENALTY_PERCENT: u8 = 100;

/// How a forfeiting player's stake is slashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitPenaltyType {
    /// Same percentage for everyone (`max_penalty`)
    Fixed,
    /// Decreases linearly from `max_penalty` to `min_penalty` over the duration
    TimeBased,
}

impl std::fmt::Display for ForfeitPenaltyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForfeitPenaltyType::Fixed => write!(f, "fixed"),
            ForfeitPenaltyType::TimeBased => write!(f, "time_based"),
        }
    }
}

/// Forfeit settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForfeitRules {
    /// Whether players may forfeit while the tournament is active
    pub allowed: bool,
    /// Penalty policy
    pub penalty_type: ForfeitPenaltyType,
    /// Highest penalty, in percent of the stake
    pub max_penalty: u8,
    /// Lowest penalty, in percent of the stake (unused by `Fixed`)
    pub min_penalty: u8,
}

impl ForfeitRules {
    /// Fixed penalty of `percent` for every forfeit
    pub fn fixed(percent: u8) -> Self {
        Self {
            allowed: true,
            penalty_type: ForfeitPenaltyType::Fixed,
            max_penalty: percent,
            min_penalty: percent,
        }
    }

    /// Penalty sliding from `max` at start down to `min` at the end
    pub fn time_based(max: u8, min: u8) -> Self {
        Self {
            allowed: true,
            penalty_type: ForfeitPenaltyType::TimeBased,
            max_penalty: max,
            min_penalty: min,
        }
    }

    /// Forfeiting disabled
    pub fn disabled() -> Self {
        Self {
            allowed: false,
            ..Self::fixed(0)
        }
    }
}

/// Tournament rules, fixed at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Earliest moment the start conditions are evaluated
    pub start_timestamp: Timestamp,
    /// Length of the active phase in seconds
    pub duration: u64,
    /// Seconds between game rounds (consumed by the combat service)
    pub game_interval: u64,
    /// Minimum number of players the tournament is designed for
    pub min_players: u32,
    /// Lock threshold; 0 means unbounded
    pub max_players: u32,
    /// Players required at start time
    pub start_player_count: u32,
    /// Active stake required at start time
    pub start_pool_amount: Amount,
    /// Identifier of the staked token
    pub stake_token: String,
    /// Smallest accepted stake
    pub min_stake: Amount,
    /// Largest accepted stake
    pub max_stake: Amount,
    /// Creator cut, in percent of the settlement pool
    pub creator_fee_percent: u8,
    /// Platform cut, in percent of the settlement pool
    pub platform_fee_percent: u8,
    /// Forfeit settings
    pub forfeit: ForfeitRules,
    /// Lives needed to exit as a winner
    pub exit_lives_required: u32,
    /// Starting coins per staked unit
    pub coin_conversion_rate: u64,
    /// Exit cost at start, in basis points of the starting coins
    pub exit_cost_base_percent_bps: u32,
    /// Growth of the exit cost per `exit_cost_interval`, in basis points
    pub exit_cost_compound_rate_bps: u32,
    /// Seconds between exit cost compounding steps
    pub exit_cost_interval: u64,
    /// Coins lost per decay tick (consumed by the combat service)
    pub decay_amount: u64,
    /// Lives each player starts with
    pub initial_lives: u32,
    /// Combat cards dealt per type (consumed by the deck service)
    pub cards_per_type: u32,
}

impl Rules {
    /// Baseline rules starting at `start_timestamp`, open to anyone staking
    /// between 10 and 1000 units, 1h long, 1% platform / 2% creator fee.
    pub fn standard(stake_token: impl Into<String>, start_timestamp: Timestamp) -> Self {
        Self {
            start_timestamp,
            duration: 3600,
            game_interval: 60,
            min_players: 1,
            max_players: 0,
            start_player_count: 2,
            start_pool_amount: 0,
            stake_token: stake_token.into(),
            min_stake: 10,
            max_stake: 1000,
            creator_fee_percent: 2,
            platform_fee_percent: 1,
            forfeit: ForfeitRules::time_based(80, 10),
            exit_lives_required: 3,
            coin_conversion_rate: 100,
            exit_cost_base_percent_bps: 0,
            exit_cost_compound_rate_bps: 0,
            exit_cost_interval: 3600,
            decay_amount: 0,
            initial_lives: 5,
            cards_per_type: 0,
        }
    }

    /// Moment the active phase would end if the tournament started at `started_at`
    pub fn end_for(&self, started_at: Timestamp) -> Option<Timestamp> {
        started_at.checked_add(self.duration)
    }

    /// Coins a player starts with for `stake`, saturating
    pub fn initial_coins(&self, stake: Amount) -> u64 {
        let coins = stake.saturating_mul(u128::from(self.coin_conversion_rate));
        u64::try_from(coins).unwrap_or(u64::MAX)
    }

    /// Coins a player staking `stake` must hold to exit `elapsed` seconds
    /// after the start
    ///
    /// The base cost is a share of the starting coins. It compounds once per
    /// full `exit_cost_interval`, rounding down at every step, and stops
    /// growing at the end of the active phase.
    pub fn exit_cost(&self, stake: Amount, elapsed: u64) -> Amount {
        let base = u128::from(self.initial_coins(stake))
            .saturating_mul(u128::from(self.exit_cost_base_percent_bps))
            / BPS_SCALE;
        let intervals = elapsed.min(self.duration) / self.exit_cost_interval.max(1);
        let growth = BPS_SCALE + u128::from(self.exit_cost_compound_rate_bps);

        let mut cost = base;
        for _ in 0..intervals {
            let next = cost.saturating_mul(growth) / BPS_SCALE;
            // Either stuck on a fixed point or beyond any coin balance
            if next == cost || next > u128::from(u64::MAX) {
                return next;
            }
            cost = next;
        }
        cost
    }

    /// Whether `stake` lies within the configured bounds
    pub fn check_stake(&self, stake: Amount) -> TournamentResult<()> {
        if stake < self.min_stake {
            return Err(TournamentError::StakeTooLow {
                min: self.min_stake,
                got: stake,
            });
        }
        if stake > self.max_stake {
            return Err(TournamentError::StakeTooHigh {
                max: self.max_stake,
                got: stake,
            });
        }
        Ok(())
    }

    /// Validate the rule set
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidRules` - Names the first offending field
    pub fn validate(&self) -> TournamentResult<()> {
        if self.stake_token.trim().is_empty() {
            return Err(invalid("stake_token", "must not be empty"));
        }

        if self.duration == 0 {
            return Err(invalid("duration", "must be greater than 0"));
        }

        if self.game_interval.saturating_mul(MIN_INTERVALS_REQUIRED) > self.duration {
            return Err(invalid(
                "game_interval",
                format!(
                    "must fit {MIN_INTERVALS_REQUIRED} times into duration ({})",
                    self.duration
                ),
            ));
        }

        if self.min_stake > self.max_stake {
            return Err(invalid(
                "min_stake",
                format!("must not exceed max_stake ({})", self.max_stake),
            ));
        }

        if self.start_player_count < self.min_players {
            return Err(invalid(
                "start_player_count",
                format!("must be at least min_players ({})", self.min_players),
            ));
        }

        if self.max_players > MAX_PLAYERS_LIMIT {
            return Err(invalid(
                "max_players",
                format!("must be at most {MAX_PLAYERS_LIMIT}"),
            ));
        }

        if self.max_players > 0 && self.max_players < self.start_player_count {
            return Err(invalid(
                "max_players",
                format!(
                    "must be 0 or at least start_player_count ({})",
                    self.start_player_count
                ),
            ));
        }

        if self.creator_fee_percent > MAX_CREATOR_FEE_PERCENT {
            return Err(invalid(
                "creator_fee_percent",
                format!("must be at most {MAX_CREATOR_FEE_PERCENT}%"),
            ));
        }

        if self.platform_fee_percent > MAX_PLATFORM_FEE_PERCENT {
            return Err(invalid(
                "platform_fee_percent",
                format!("must be at most {MAX_PLATFORM_FEE_PERCENT}%"),
            ));
        }

        let combined_fee = u16::from(self.creator_fee_percent) + u16::from(self.platform_fee_percent);
        if combined_fee > u16::from(MAX_COMBINED_FEE_PERCENT) {
            return Err(invalid(
                "creator_fee_percent",
                format!(
                    "creator + platform fees must be at most {MAX_COMBINED_FEE_PERCENT}%, got {combined_fee}%"
                ),
            ));
        }

        if self.forfeit.max_penalty > MAX_PENALTY_PERCENT {
            return Err(invalid("forfeit.max_penalty", "must be at most 100"));
        }

        if self.forfeit.min_penalty > self.forfeit.max_penalty {
            return Err(invalid(
                "forfeit.min_penalty",
                format!(
                    "must not exceed forfeit.max_penalty ({})",
                    self.forfeit.max_penalty
                ),
            ));
        }

        if self.exit_cost_base_percent_bps > MAX_EXIT_COST_BPS {
            return Err(invalid(
                "exit_cost_base_percent_bps",
                format!("must be at most {MAX_EXIT_COST_BPS}"),
            ));
        }

        if self.exit_cost_compound_rate_bps > MAX_EXIT_COST_BPS {
            return Err(invalid(
                "exit_cost_compound_rate_bps",
                format!("must be at most {MAX_EXIT_COST_BPS}"),
            ));
        }

        if self.exit_cost_interval == 0 {
            return Err(invalid("exit_cost_interval", "must be greater than 0"));
        }

        if self.cards_per_type > MAX_CARDS_PER_TYPE {
            return Err(invalid(
                "cards_per_type",
                format!("must be at most {MAX_CARDS_PER_TYPE}"),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> TournamentError {
    TournamentError::InvalidRules {
        field: field.to_string(),
        reason: reason.into(),
    }
}
