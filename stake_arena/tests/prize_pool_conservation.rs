//! Prize pool conservation tests.
//!
//! Drives a tournament through random operation sequences and checks after
//! every step that the escrow holds exactly what the engine's accounting
//! says, and that no token is created or destroyed.

use proptest::prelude::*;
use stake_arena::standings::PlayerStanding;
use stake_arena::tournament::{
    Amount, ForfeitRules, PlayerId, PlayerStatus, Rules, Timestamp, Tournament, TournamentStatus,
};
use stake_arena::wallet::WalletManager;

const START: Timestamp = 500;
const CREATOR: PlayerId = 100;
const ADMIN: PlayerId = 101;
const TREASURY: PlayerId = 102;
const PLAYERS: PlayerId = 6;
const FUNDING: Amount = 5_000;

#[derive(Debug, Clone)]
enum Op {
    Join(PlayerId, Amount),
    Withdraw(PlayerId),
    Advance(u64),
    Forfeit(PlayerId),
    Exit(PlayerId, u32),
    Claim(PlayerId),
    CreatorFee,
    PlatformFee,
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1..=PLAYERS, 1u128..=1_200).prop_map(|(p, s)| Op::Join(p, s)),
        2 => (1..=PLAYERS).prop_map(Op::Withdraw),
        3 => (0u64..=400).prop_map(Op::Advance),
        2 => (1..=PLAYERS).prop_map(Op::Forfeit),
        2 => (1..=PLAYERS, 0u32..=6).prop_map(|(p, l)| Op::Exit(p, l)),
        2 => (1..=PLAYERS).prop_map(Op::Claim),
        1 => Just(Op::CreatorFee),
        1 => Just(Op::PlatformFee),
        1 => Just(Op::Cancel),
    ]
}

fn rules() -> Rules {
    let mut rules = Rules::standard("USDC", START);
    rules.duration = 1000;
    rules.game_interval = 10;
    rules.max_players = 4;
    rules.start_player_count = 2;
    rules.creator_fee_percent = 3;
    rules.platform_fee_percent = 2;
    rules.forfeit = ForfeitRules::time_based(80, 10);
    rules
}

fn apply(t: &mut Tournament, wallets: &WalletManager, now: &mut Timestamp, op: &Op) {
    // Rejected operations are part of the exercise; only state matters
    let _ = match *op {
        Op::Join(p, stake) => t.join(p, stake, *now, wallets).map(|_| ()),
        Op::Withdraw(p) => t.withdraw(p, wallets).map(|_| ()),
        Op::Advance(dt) => {
            *now += dt;
            t.evaluate(*now).map(|_| ())
        }
        Op::Forfeit(p) => t.forfeit(p, *now, wallets).map(|_| ()),
        Op::Exit(p, lives) => t.exit(p, &PlayerStanding::new(lives, 0), *now),
        Op::Claim(p) => t.claim_prize(p, wallets).map(|_| ()),
        Op::CreatorFee => t.collect_creator_fees(CREATOR, wallets).map(|_| ()),
        Op::PlatformFee => t.collect_platform_fees(ADMIN, wallets).map(|_| ()),
        Op::Cancel => t.emergency_cancel(ADMIN).map(|_| ()),
    };
}

fn check_invariants(t: &Tournament, wallets: &WalletManager) -> Result<(), TestCaseError> {
    let state = t.state();

    prop_assert_eq!(
        wallets.total_supply().unwrap(),
        FUNDING * PLAYERS as Amount
    );

    let escrowed = wallets.get_escrow(t.id()).map_or(0, |e| e.balance);
    let expected = state.total_pool_amount
        - state.refunded_amount
        - state.prizes_paid
        - state.fees_paid;
    prop_assert_eq!(escrowed, expected);
    prop_assert_eq!(escrowed, t.escrow_balance());

    prop_assert!(state.active_stake_sum <= state.total_pool_amount);
    // Only withdraw and forfeit release a stake; winners keep theirs counted
    let counted_stake: Amount = t
        .records()
        .filter(|r| {
            matches!(
                r.status,
                PlayerStatus::Active | PlayerStatus::Exited | PlayerStatus::PrizeClaimed
            )
        })
        .map(|r| r.stake_amount)
        .sum();
    prop_assert_eq!(counted_stake, state.active_stake_sum);

    let counted = t
        .records()
        .filter(|r| r.status != PlayerStatus::Refunded)
        .count();
    prop_assert_eq!(counted, state.player_count as usize);

    prop_assert_ne!(state.status, TournamentStatus::PendingStart);

    if state.status == TournamentStatus::Ended {
        prop_assert!(state.prizes_paid + state.fees_paid <= t.settlement_pool().unwrap());
    }

    Ok(())
}

proptest! {
    #[test]
    fn test_escrow_matches_accounting(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let wallets = WalletManager::new();
        for player in 1..=PLAYERS {
            wallets.deposit(player, FUNDING).unwrap();
        }
        let mut t = Tournament::new(1, rules(), CREATOR, ADMIN, TREASURY).unwrap();
        let mut now = 0;

        for op in &ops {
            apply(&mut t, &wallets, &mut now, op);
            check_invariants(&t, &wallets)?;
        }
    }

    #[test]
    fn test_full_settlement_leaves_only_remainder(
        stakes in prop::collection::vec(10u128..=1_000, 2..=4),
        winner_mask in 1u8..16,
    ) {
        let wallets = WalletManager::new();
        let mut t = Tournament::new(1, rules(), CREATOR, ADMIN, TREASURY).unwrap();
        for (i, stake) in stakes.iter().enumerate() {
            let player = i as PlayerId + 1;
            wallets.deposit(player, *stake).unwrap();
            t.join(player, *stake, 0, &wallets).unwrap();
        }
        t.evaluate(START).unwrap();

        let players = stakes.len() as PlayerId;
        for player in 1..=players {
            if winner_mask & (1 << (player - 1)) != 0 {
                t.exit(player, &PlayerStanding::new(5, 0), START).unwrap();
            }
        }
        t.evaluate(START + 1000).unwrap();

        for winner in t.winners() {
            t.claim_prize(winner, &wallets).unwrap();
        }
        t.collect_creator_fees(CREATOR, &wallets).unwrap();
        t.collect_platform_fees(ADMIN, &wallets).unwrap();

        let remainder = t.unclaimed_remainder().unwrap();
        prop_assert_eq!(wallets.get_escrow(1).unwrap().balance, remainder);
        if !t.winners().is_empty() {
            prop_assert!(remainder < t.winners().len() as Amount);
        }
    }
}

fn replay(ops: &[Op]) -> (Tournament, WalletManager) {
    let wallets = WalletManager::new();
    for player in 1..=PLAYERS {
        wallets.deposit(player, FUNDING).unwrap();
    }
    let mut t = Tournament::new(1, rules(), CREATOR, ADMIN, TREASURY).unwrap();
    let mut now = 0;
    for op in ops {
        apply(&mut t, &wallets, &mut now, op);
        check_invariants(&t, &wallets).unwrap();
    }
    (t, wallets)
}

#[test]
fn test_exited_stake_stays_counted() {
    let (t, _) = replay(&[
        Op::Advance(372),
        Op::Join(1, 10),
        Op::Advance(105),
        Op::Join(3, 10),
        Op::Advance(23),
        Op::Exit(3, 3),
    ]);

    assert_eq!(t.status(), TournamentStatus::Active);
    assert_eq!(t.player(3).unwrap().status, PlayerStatus::Exited);
    assert_eq!(t.state().active_stake_sum, 20);
}

#[test]
fn test_claimed_and_forfeited_stakes() {
    let (t, _) = replay(&[
        Op::Join(1, 100),
        Op::Join(2, 100),
        Op::Join(3, 100),
        Op::Advance(START),
        Op::Forfeit(2),
        Op::Exit(1, 5),
        Op::Advance(1000),
        Op::Claim(1),
    ]);

    assert_eq!(t.player(1).unwrap().status, PlayerStatus::PrizeClaimed);
    // Only the forfeited stake was released
    assert_eq!(t.state().active_stake_sum, 200);
}

#[test]
fn test_claim_twice_pays_once() {
    let wallets = WalletManager::new();
    let mut t = Tournament::new(1, rules(), CREATOR, ADMIN, TREASURY).unwrap();
    for player in 1..=2 {
        wallets.deposit(player, 100).unwrap();
        t.join(player, 100, 0, &wallets).unwrap();
    }
    t.evaluate(START).unwrap();
    t.exit(1, &PlayerStanding::new(5, 0), START).unwrap();
    t.evaluate(START + 1000).unwrap();

    let first = t.claim_prize(1, &wallets).unwrap();
    assert!(t.claim_prize(1, &wallets).is_err());
    assert_eq!(wallets.balance(1).unwrap(), first.amount);
    assert_eq!(t.state().prizes_paid, first.amount);
}
