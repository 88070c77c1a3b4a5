/// Property-based tests for the forfeit penalty calculation
///
/// These tests check the penalty bounds and the time monotonicity across
/// randomly generated policies and timings.
use proptest::prelude::*;
use stake_arena::tournament::{
    ForfeitPenaltyType, PenaltyRate,
    penalty::{BPS_SCALE, penalty},
};

// (min, max) with min <= max <= 100
fn bounds_strategy() -> impl Strategy<Value = (u8, u8)> {
    (0u8..=100).prop_flat_map(|max| (0u8..=max, Just(max)))
}

proptest! {
    #[test]
    fn test_time_based_within_bounds(
        (min, max) in bounds_strategy(),
        duration in 1u64..=10_000_000,
        elapsed in 0u64..=20_000_000,
    ) {
        let rate = penalty(ForfeitPenaltyType::TimeBased, elapsed, duration, min, max);
        prop_assert!(rate >= PenaltyRate::from_percent(min));
        prop_assert!(rate <= PenaltyRate::from_percent(max));
    }

    #[test]
    fn test_time_based_non_increasing(
        (min, max) in bounds_strategy(),
        duration in 1u64..=10_000_000,
        a in 0u64..=10_000_000,
        b in 0u64..=10_000_000,
    ) {
        let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
        let early = penalty(ForfeitPenaltyType::TimeBased, earlier, duration, min, max);
        let late = penalty(ForfeitPenaltyType::TimeBased, later, duration, min, max);
        prop_assert!(late <= early);
    }

    #[test]
    fn test_fixed_is_max(
        (min, max) in bounds_strategy(),
        duration in 0u64..=10_000_000,
        elapsed in 0u64..=10_000_000,
    ) {
        let rate = penalty(ForfeitPenaltyType::Fixed, elapsed, duration, min, max);
        prop_assert_eq!(rate, PenaltyRate::from_percent(max));
    }

    #[test]
    fn test_refund_and_retained_split_stake(
        percent in 0u8..=100,
        stake in 0u128..=(u64::MAX as u128),
    ) {
        let rate = PenaltyRate::from_percent(percent);
        let retained = rate.retained(stake).unwrap();
        let refund = rate.refund(stake).unwrap();

        prop_assert_eq!(retained + refund, stake);
        prop_assert!(rate.bps() <= BPS_SCALE);
        prop_assert!(retained <= stake);
    }
}
