//! Player stake ledger: join, withdraw, forfeit and exit.
//!
//! Every operation validates and computes its new totals first, then performs
//! the escrow transfer, and only then mutates state. A rejected transfer
//! therefore leaves the tournament untouched.

use super::{
    errors::{ExitBlock, TournamentError, TournamentResult},
    instance::Tournament,
    models::{
        Amount, Payout, PlayerId, PlayerRecord, PlayerStatus, StatusTransition, Timestamp,
        TournamentStatus,
    },
    penalty,
};
use crate::{standings::PlayerStanding, wallet::Escrow, wallet::EntryType};

/// Result of a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub refund: Payout,
    /// `Locked -> Open` when the withdrawal freed a seat
    pub transition: Option<StatusTransition>,
}

impl Tournament {
    /// Join with `stake`, escrowing it from the player's wallet
    ///
    /// A player who withdrew earlier may join again; the refunded record is
    /// replaced.
    ///
    /// # Returns
    ///
    /// * `TournamentResult<Option<StatusTransition>>` - `Open -> Locked` if this join filled the tournament
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - Tournament not `Open`
    /// * `TournamentError::StakeTooLow` / `StakeTooHigh` - Stake outside bounds
    /// * `TournamentError::AlreadyJoined` - Player holds a live record
    /// * `TournamentError::Escrow` - Stake transfer failed
    pub fn join(
        &mut self,
        player_id: PlayerId,
        stake: Amount,
        now: Timestamp,
        escrow: &dyn Escrow,
    ) -> TournamentResult<Option<StatusTransition>> {
        self.require_status(TournamentStatus::Open)?;
        self.rules.check_stake(stake)?;

        let rejoining = match self.players.get(&player_id) {
            Some(record) if record.status != PlayerStatus::Refunded => {
                return Err(TournamentError::AlreadyJoined(player_id));
            }
            Some(_) => true,
            None => false,
        };

        let player_count = self
            .state
            .player_count
            .checked_add(1)
            .ok_or(TournamentError::ArithmeticOverflow)?;
        let total_pool = checked_add(self.state.total_pool_amount, stake)?;
        let active_stake = checked_add(self.state.active_stake_sum, stake)?;

        self.escrow_in(escrow, player_id, stake, EntryType::Stake)?;

        self.state.player_count = player_count;
        self.state.total_pool_amount = total_pool;
        self.state.active_stake_sum = active_stake;
        self.players.insert(
            player_id,
            PlayerRecord {
                player_id,
                stake_amount: stake,
                status: PlayerStatus::Active,
                joined_at: now,
            },
        );
        if !rejoining {
            self.roster.push(player_id);
        }

        log::info!(
            "Tournament {}: player {} joined with {} (players: {}, pool: {})",
            self.id,
            player_id,
            stake,
            player_count,
            total_pool
        );

        Ok(self.lock_if_full())
    }

    /// Return a player's full stake
    ///
    /// Allowed before start and after cancellation.
    ///
    /// # Errors
    ///
    /// * `TournamentError::CannotRefundAfterStart` - Tournament `Active` or `Ended`
    /// * `TournamentError::PlayerNotFound` - No live record for the player
    /// * `TournamentError::InvalidPlayerState` - Player already exited or forfeited
    /// * `TournamentError::Escrow` - Refund transfer failed
    pub fn withdraw(
        &mut self,
        player_id: PlayerId,
        escrow: &dyn Escrow,
    ) -> TournamentResult<Withdrawal> {
        match self.state.status {
            TournamentStatus::Open | TournamentStatus::Locked | TournamentStatus::Cancelled => {}
            TournamentStatus::Active | TournamentStatus::Ended => {
                return Err(TournamentError::CannotRefundAfterStart);
            }
            actual @ TournamentStatus::PendingStart => {
                return Err(TournamentError::InvalidStatus { actual });
            }
        }

        let stake = match self.players.get(&player_id) {
            None => return Err(TournamentError::PlayerNotFound(player_id)),
            Some(record) if record.status == PlayerStatus::Refunded => {
                return Err(TournamentError::PlayerNotFound(player_id));
            }
            Some(record) if record.status != PlayerStatus::Active => {
                return Err(TournamentError::InvalidPlayerState {
                    player_id,
                    from: record.status,
                    to: PlayerStatus::Refunded,
                });
            }
            Some(record) => record.stake_amount,
        };

        let player_count = self
            .state
            .player_count
            .checked_sub(1)
            .ok_or(TournamentError::ArithmeticOverflow)?;
        let active_stake = checked_sub(self.state.active_stake_sum, stake)?;
        let refunded = checked_add(self.state.refunded_amount, stake)?;

        self.escrow_out(escrow, player_id, stake, EntryType::Refund)?;

        self.transition_player(player_id, PlayerStatus::Refunded)?;
        self.state.player_count = player_count;
        self.state.active_stake_sum = active_stake;
        self.state.refunded_amount = refunded;

        log::info!(
            "Tournament {}: player {} withdrew {} (players: {})",
            self.id,
            player_id,
            stake,
            player_count
        );

        Ok(Withdrawal {
            refund: Payout {
                recipient: player_id,
                amount: stake,
            },
            transition: self.unlock_if_room(),
        })
    }

    /// Leave an active tournament early for a partial refund
    ///
    /// The penalty follows the forfeit rules and the time elapsed since start.
    /// The retained part stays in the pool for the winners. The player keeps
    /// counting towards `player_count` but can never win.
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - Tournament not `Active`
    /// * `TournamentError::ForfeitNotAllowed` - Forfeiting disabled by the rules
    /// * `TournamentError::PlayerNotFound` - Player never joined
    /// * `TournamentError::InvalidPlayerState` - Player not `Active`
    pub fn forfeit(
        &mut self,
        player_id: PlayerId,
        now: Timestamp,
        escrow: &dyn Escrow,
    ) -> TournamentResult<Payout> {
        self.require_status(TournamentStatus::Active)?;
        if !self.rules.forfeit.allowed {
            return Err(TournamentError::ForfeitNotAllowed);
        }

        let record = self.player(player_id)?;
        if record.status != PlayerStatus::Active {
            return Err(TournamentError::InvalidPlayerState {
                player_id,
                from: record.status,
                to: PlayerStatus::Forfeited,
            });
        }
        let stake = record.stake_amount;

        let started_at = self.state.started_at.unwrap_or(now);
        let elapsed = now.saturating_sub(started_at);
        let rate = penalty::for_rules(&self.rules.forfeit, elapsed, self.rules.duration);
        let refund = rate
            .refund(stake)
            .ok_or(TournamentError::ArithmeticOverflow)?;

        let active_stake = checked_sub(self.state.active_stake_sum, stake)?;
        let refunded = checked_add(self.state.refunded_amount, refund)?;

        self.escrow_out(escrow, player_id, refund, EntryType::ForfeitRefund)?;

        self.transition_player(player_id, PlayerStatus::Forfeited)?;
        self.state.active_stake_sum = active_stake;
        self.state.refunded_amount = refunded;

        log::info!(
            "Tournament {}: player {} forfeited after {}s, penalty {} bps, refund {} of {}",
            self.id,
            player_id,
            elapsed,
            rate.bps(),
            refund,
            stake
        );

        Ok(Payout {
            recipient: player_id,
            amount: refund,
        })
    }

    /// Standing of a player the combat service has not reported on yet
    pub fn initial_standing(&self, player_id: PlayerId) -> TournamentResult<PlayerStanding> {
        let record = self.player(player_id)?;
        Ok(PlayerStanding::new(
            self.rules.initial_lives,
            self.rules.initial_coins(record.stake_amount),
        ))
    }

    /// Exit as a winner
    ///
    /// No funds move; the player becomes eligible for a prize share. The
    /// exit cost is checked against the reported coins but not deducted here;
    /// coins live with the combat service.
    ///
    /// # Arguments
    ///
    /// * `standing` - Latest standing reported by the combat service
    /// * `now` - Used to compound the exit cost
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - Tournament not `Active`
    /// * `TournamentError::PlayerNotFound` - Player never joined
    /// * `TournamentError::InvalidPlayerState` - Player not `Active`
    /// * `TournamentError::CannotExit` - Not enough lives and no completed
    ///   objective, or not enough coins for the exit cost
    pub fn exit(
        &mut self,
        player_id: PlayerId,
        standing: &PlayerStanding,
        now: Timestamp,
    ) -> TournamentResult<()> {
        self.require_status(TournamentStatus::Active)?;

        let record = self.player(player_id)?;
        if record.status != PlayerStatus::Active {
            return Err(TournamentError::InvalidPlayerState {
                player_id,
                from: record.status,
                to: PlayerStatus::Exited,
            });
        }

        let required = self.rules.exit_lives_required;
        if !standing.is_exit_eligible(required) {
            return Err(TournamentError::CannotExit(ExitBlock::Lives {
                lives: standing.lives,
                required,
            }));
        }

        let started_at = self.state.started_at.unwrap_or(now);
        let cost = self
            .rules
            .exit_cost(record.stake_amount, now.saturating_sub(started_at));
        if u128::from(standing.coins) < cost {
            return Err(TournamentError::CannotExit(ExitBlock::Coins {
                coins: standing.coins,
                cost,
            }));
        }

        self.transition_player(player_id, PlayerStatus::Exited)?;
        log::info!(
            "Tournament {}: player {} exited with {} lives{}",
            self.id,
            player_id,
            standing.lives,
            if standing.objective_completed {
                " (objective completed)"
            } else {
                ""
            }
        );

        Ok(())
    }
}

pub(super) fn checked_add(a: Amount, b: Amount) -> TournamentResult<Amount> {
    a.checked_add(b).ok_or(TournamentError::ArithmeticOverflow)
}

pub(super) fn checked_sub(a: Amount, b: Amount) -> TournamentResult<Amount> {
    a.checked_sub(b).ok_or(TournamentError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tournament::rules::{ForfeitRules, Rules},
        wallet::{WalletError, WalletManager},
    };

    const START: Timestamp = 1_000;

    fn setup(max_players: u32) -> (Tournament, WalletManager) {
        let mut rules = Rules::standard("USDC", START);
        rules.max_players = max_players;
        rules.duration = 1000;
        rules.game_interval = 10;
        rules.forfeit = ForfeitRules::fixed(50);

        let wallets = WalletManager::new();
        for player in 1..=5 {
            wallets.deposit(player, 1_000).unwrap();
        }
        (Tournament::new(7, rules, 100, 200, 300).unwrap(), wallets)
    }

    fn start(t: &mut Tournament) {
        assert_eq!(
            t.evaluate(START).unwrap().map(|tr| tr.to),
            Some(TournamentStatus::Active)
        );
    }

    #[test]
    fn test_join_escrows_stake() {
        let (mut t, wallets) = setup(0);

        assert_eq!(t.join(1, 100, 10, &wallets).unwrap(), None);
        assert_eq!(t.player_count(), 1);
        assert_eq!(t.state().total_pool_amount, 100);
        assert_eq!(t.state().active_stake_sum, 100);
        assert_eq!(wallets.balance(1).unwrap(), 900);
        assert_eq!(wallets.get_escrow(7).unwrap().balance, 100);

        let record = t.player(1).unwrap();
        assert_eq!(record.status, PlayerStatus::Active);
        assert_eq!(record.joined_at, 10);
    }

    #[test]
    fn test_join_twice_rejected() {
        let (mut t, wallets) = setup(0);
        t.join(1, 100, 10, &wallets).unwrap();
        assert!(matches!(
            t.join(1, 100, 11, &wallets),
            Err(TournamentError::AlreadyJoined(1))
        ));
        assert_eq!(t.player_count(), 1);
    }

    #[test]
    fn test_failed_transfer_leaves_state() {
        let (mut t, wallets) = setup(0);
        let err = t.join(42, 100, 10, &wallets).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::Escrow(WalletError::WalletNotFound(42))
        ));
        assert_eq!(t.player_count(), 0);
        assert_eq!(t.state().total_pool_amount, 0);
        assert!(t.player(42).is_err());
    }

    #[test]
    fn test_lock_and_unlock() {
        let (mut t, wallets) = setup(2);

        assert_eq!(t.join(1, 100, 10, &wallets).unwrap(), None);
        let locked = t.join(2, 100, 11, &wallets).unwrap().unwrap();
        assert_eq!(locked.to, TournamentStatus::Locked);

        assert!(matches!(
            t.join(3, 100, 12, &wallets),
            Err(TournamentError::InvalidStatus {
                actual: TournamentStatus::Locked
            })
        ));

        let withdrawal = t.withdraw(2, &wallets).unwrap();
        assert_eq!(withdrawal.refund.amount, 100);
        assert_eq!(
            withdrawal.transition.map(|tr| tr.to),
            Some(TournamentStatus::Open)
        );
        assert_eq!(wallets.balance(2).unwrap(), 1_000);
    }

    #[test]
    fn test_rejoin_after_withdraw() {
        let (mut t, wallets) = setup(0);
        t.join(1, 100, 10, &wallets).unwrap();
        t.withdraw(1, &wallets).unwrap();
        assert!(matches!(
            t.withdraw(1, &wallets),
            Err(TournamentError::PlayerNotFound(1))
        ));

        t.join(1, 200, 20, &wallets).unwrap();
        assert_eq!(t.player(1).unwrap().stake_amount, 200);
        assert_eq!(t.player_count(), 1);
        assert_eq!(t.records().count(), 1);
        assert_eq!(t.state().total_pool_amount, 300);
        assert_eq!(t.state().active_stake_sum, 200);
    }

    #[test]
    fn test_withdraw_after_start_rejected() {
        let (mut t, wallets) = setup(0);
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);

        assert!(matches!(
            t.withdraw(1, &wallets),
            Err(TournamentError::CannotRefundAfterStart)
        ));
        assert!(matches!(
            t.join(3, 100, START, &wallets),
            Err(TournamentError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_forfeit_fixed_penalty() {
        let (mut t, wallets) = setup(0);
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);

        let payout = t.forfeit(1, START + 500, &wallets).unwrap();
        assert_eq!(payout.amount, 50);
        assert_eq!(wallets.balance(1).unwrap(), 950);
        assert_eq!(t.player(1).unwrap().status, PlayerStatus::Forfeited);
        assert_eq!(t.player_count(), 2);
        assert_eq!(t.state().active_stake_sum, 100);
        assert_eq!(t.escrow_balance(), 150);

        assert!(matches!(
            t.forfeit(1, START + 501, &wallets),
            Err(TournamentError::InvalidPlayerState { .. })
        ));
    }

    #[test]
    fn test_forfeit_disabled() {
        let (mut t, wallets) = setup(0);
        t.rules.forfeit = ForfeitRules::disabled();
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);

        assert!(matches!(
            t.forfeit(1, START, &wallets),
            Err(TournamentError::ForfeitNotAllowed)
        ));
    }

    #[test]
    fn test_exit_conditions() {
        let (mut t, wallets) = setup(0);
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);

        let weak = PlayerStanding::new(2, 0);
        assert!(matches!(
            t.exit(1, &weak, START),
            Err(TournamentError::CannotExit(ExitBlock::Lives {
                lives: 2,
                required: 3
            }))
        ));

        let objective = PlayerStanding {
            objective_completed: true,
            ..weak
        };
        t.exit(1, &objective, START).unwrap();
        t.exit(2, &PlayerStanding::new(5, 0), START).unwrap();
        assert_eq!(t.winners(), vec![1, 2]);

        assert!(matches!(
            t.withdraw(1, &wallets),
            Err(TournamentError::CannotRefundAfterStart)
        ));
    }

    #[test]
    fn test_withdraw_exited_after_cancel() {
        let (mut t, wallets) = setup(0);
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);
        t.exit(1, &PlayerStanding::new(5, 0), START).unwrap();
        t.emergency_cancel(200).unwrap();

        assert!(matches!(
            t.withdraw(1, &wallets),
            Err(TournamentError::InvalidPlayerState { .. })
        ));
        assert_eq!(t.withdraw(2, &wallets).unwrap().refund.amount, 100);
        assert_eq!(t.escrow_balance(), 100);
    }

    fn with_exit_cost(t: &mut Tournament) {
        t.rules.exit_cost_base_percent_bps = 10_000;
        t.rules.exit_cost_compound_rate_bps = 1_000;
        t.rules.exit_cost_interval = 100;
    }

    #[test]
    fn test_exit_requires_coins_for_cost() {
        let (mut t, wallets) = setup(0);
        with_exit_cost(&mut t);
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);

        // Lives alone are not enough once exiting costs coins
        let broke = PlayerStanding::new(5, 0);
        assert!(matches!(
            t.exit(1, &broke, START),
            Err(TournamentError::CannotExit(ExitBlock::Coins {
                coins: 0,
                cost: 10_000
            }))
        ));
        assert_eq!(t.player(1).unwrap().status, PlayerStatus::Active);

        // Starting coins cover the cost right at the start
        let initial = t.initial_standing(1).unwrap();
        assert_eq!(initial.coins, 10_000);
        t.exit(1, &initial, START).unwrap();

        // Two intervals later the same coins fall short
        let initial = t.initial_standing(2).unwrap();
        assert!(matches!(
            t.exit(2, &initial, START + 200),
            Err(TournamentError::CannotExit(ExitBlock::Coins { cost: 12_100, .. }))
        ));
        let richer = PlayerStanding::new(5, 12_100);
        t.exit(2, &richer, START + 200).unwrap();
        assert_eq!(t.winners(), vec![1, 2]);
    }

    #[test]
    fn test_objective_does_not_waive_exit_cost() {
        let (mut t, wallets) = setup(0);
        with_exit_cost(&mut t);
        t.join(1, 100, 10, &wallets).unwrap();
        t.join(2, 100, 10, &wallets).unwrap();
        start(&mut t);

        let objective = PlayerStanding {
            objective_completed: true,
            ..PlayerStanding::new(0, 0)
        };
        assert!(matches!(
            t.exit(1, &objective, START),
            Err(TournamentError::CannotExit(ExitBlock::Coins { .. }))
        ));
    }

    #[test]
    fn test_initial_standing_unknown_player() {
        let (t, _) = setup(0);
        assert!(matches!(
            t.initial_standing(4),
            Err(TournamentError::PlayerNotFound(4))
        ));
    }
}
