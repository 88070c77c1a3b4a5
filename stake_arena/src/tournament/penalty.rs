//! Forfeit penalty calculation.
//!
//! Penalties are computed in basis points so that a time-based slide keeps
//! sub-percent precision while staying in integer arithmetic.

use super::models::Amount;
use super::rules::{ForfeitPenaltyType, ForfeitRules};

/// One whole stake, in basis points
pub const BPS_SCALE: u128 = 10_000;

/// Basis points per percent
const BPS_PER_PERCENT: u128 = 100;

/// Penalty rate in basis points of the stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PenaltyRate(u128);

impl PenaltyRate {
    /// Rate from a whole percentage
    pub fn from_percent(percent: u8) -> Self {
        Self(u128::from(percent) * BPS_PER_PERCENT)
    }

    /// Rate in basis points
    pub fn bps(self) -> u128 {
        self.0
    }

    /// Amount kept from `stake`, rounded down
    pub fn retained(self, stake: Amount) -> Option<Amount> {
        Some(stake.checked_mul(self.0)? / BPS_SCALE)
    }

    /// Amount returned from `stake`; the rounding residue goes to the player
    pub fn refund(self, stake: Amount) -> Option<Amount> {
        stake.checked_sub(self.retained(stake)?)
    }
}

/// Penalty for forfeiting after `elapsed` seconds of a `duration`-long tournament
///
/// `Fixed` always returns `max_pct`. `TimeBased` slides linearly from `max_pct`
/// at `elapsed == 0` to `min_pct` at `elapsed >= duration`; the result never
/// leaves `[min_pct, max_pct]` and never increases with `elapsed`.
pub fn penalty(
    policy: ForfeitPenaltyType,
    elapsed: u64,
    duration: u64,
    min_pct: u8,
    max_pct: u8,
) -> PenaltyRate {
    let max = PenaltyRate::from_percent(max_pct);
    match policy {
        ForfeitPenaltyType::Fixed => max,
        ForfeitPenaltyType::TimeBased => {
            let min = PenaltyRate::from_percent(min_pct.min(max_pct));
            if duration == 0 {
                return min;
            }
            let elapsed = u128::from(elapsed.min(duration));
            let spread = max.0 - min.0;
            // spread <= 10_000 and elapsed <= u64::MAX, so the product fits
            let reduction = spread * elapsed / u128::from(duration);
            PenaltyRate(max.0 - reduction)
        }
    }
}

/// Penalty under a tournament's forfeit rules
pub fn for_rules(rules: &ForfeitRules, elapsed: u64, duration: u64) -> PenaltyRate {
    penalty(
        rules.penalty_type,
        elapsed,
        duration,
        rules.min_penalty,
        rules.max_penalty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ignores_time_and_min() {
        for elapsed in [0, 500, 1000, 5000] {
            let rate = penalty(ForfeitPenaltyType::Fixed, elapsed, 1000, 10, 50);
            assert_eq!(rate, PenaltyRate::from_percent(50));
        }
    }

    #[test]
    fn test_fixed_fifty_percent_refund() {
        let rate = penalty(ForfeitPenaltyType::Fixed, 0, 1000, 50, 50);
        assert_eq!(rate.refund(100), Some(50));
        assert_eq!(rate.retained(100), Some(50));
    }

    #[test]
    fn test_time_based_endpoints() {
        let start = penalty(ForfeitPenaltyType::TimeBased, 0, 1000, 10, 80);
        let end = penalty(ForfeitPenaltyType::TimeBased, 1000, 1000, 10, 80);
        let past_end = penalty(ForfeitPenaltyType::TimeBased, 5000, 1000, 10, 80);

        assert_eq!(start.bps(), 8000);
        assert_eq!(end.bps(), 1000);
        assert_eq!(past_end, end);
    }

    #[test]
    fn test_time_based_midpoint() {
        let mid = penalty(ForfeitPenaltyType::TimeBased, 500, 1000, 10, 80);
        assert_eq!(mid.bps(), 4500);
        assert_eq!(mid.refund(100), Some(55));
    }

    #[test]
    fn test_refund_rounds_down_penalty() {
        // 33.33% of 10 = 3.333 retained -> 3 retained, 7 refunded
        let rate = PenaltyRate(3333);
        assert_eq!(rate.retained(10), Some(3));
        assert_eq!(rate.refund(10), Some(7));
    }

    #[test]
    fn test_zero_duration_falls_to_min() {
        let rate = penalty(ForfeitPenaltyType::TimeBased, 0, 0, 10, 80);
        assert_eq!(rate, PenaltyRate::from_percent(10));
    }

    #[test]
    fn test_overflowing_stake() {
        let rate = PenaltyRate::from_percent(50);
        assert_eq!(rate.retained(u128::MAX), None);
    }
}
