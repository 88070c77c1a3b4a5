//! Tournament status state machine.
//!
//! ```text
//! Open ──(full)──> Locked ──(withdraw)──> Open
//!   │                 │
//!   └──(now >= start)─┴──> PendingStart ──> Active ──(now >= end)──> Ended
//!                                 │
//!                                 └──> Cancelled
//! ```
//!
//! `PendingStart` only exists inside [`Tournament::evaluate`]; it is always
//! resolved before the call returns.

use super::{
    errors::{TournamentError, TournamentResult},
    instance::Tournament,
    models::{PlayerId, StatusTransition, Timestamp, TournamentStatus},
};

impl Tournament {
    /// Advance the state machine to `now`
    ///
    /// Anyone may call this at any time. When no transition condition holds
    /// it does nothing and returns `Ok(None)`.
    ///
    /// # Returns
    ///
    /// * `TournamentResult<Option<StatusTransition>>` - The transition performed, if any
    pub fn evaluate(&mut self, now: Timestamp) -> TournamentResult<Option<StatusTransition>> {
        let from = self.state.status;
        match from {
            TournamentStatus::Open | TournamentStatus::Locked
                if now >= self.rules.start_timestamp =>
            {
                self.resolve_start(from, now).map(Some)
            }
            TournamentStatus::Active => match self.state.ended_at {
                Some(end) if now >= end => Ok(Some(self.set_status(TournamentStatus::Ended))),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn resolve_start(
        &mut self,
        from: TournamentStatus,
        now: Timestamp,
    ) -> TournamentResult<StatusTransition> {
        let end = self
            .rules
            .end_for(now)
            .ok_or(TournamentError::ArithmeticOverflow)?;

        self.set_status(TournamentStatus::PendingStart);

        let enough_players = self.state.player_count >= self.rules.start_player_count;
        let enough_stake = self.state.active_stake_sum >= self.rules.start_pool_amount;
        log::debug!(
            "Tournament {} start check: {} players (need {}), {} staked (need {})",
            self.id,
            self.state.player_count,
            self.rules.start_player_count,
            self.state.active_stake_sum,
            self.rules.start_pool_amount
        );

        let to = if enough_players && enough_stake {
            self.state.started_at = Some(now);
            self.state.ended_at = Some(end);
            TournamentStatus::Active
        } else {
            TournamentStatus::Cancelled
        };

        let resolved = self.set_status(to);
        Ok(StatusTransition {
            from,
            to: resolved.to,
        })
    }

    /// Lock the tournament when the join that just happened filled it
    pub(super) fn lock_if_full(&mut self) -> Option<StatusTransition> {
        let max = self.rules.max_players;
        if self.state.status == TournamentStatus::Open && max > 0 && self.state.player_count >= max
        {
            return Some(self.set_status(TournamentStatus::Locked));
        }
        None
    }

    /// Reopen a locked tournament once a seat frees up
    pub(super) fn unlock_if_room(&mut self) -> Option<StatusTransition> {
        if self.state.status == TournamentStatus::Locked
            && self.state.player_count < self.rules.max_players
        {
            return Some(self.set_status(TournamentStatus::Open));
        }
        None
    }

    /// Force the tournament into `Cancelled`
    ///
    /// Players still `Active` become refundable through `withdraw`. Exited and
    /// forfeited players keep their records; their funds stay escrowed.
    ///
    /// # Errors
    ///
    /// * `TournamentError::Unauthorized` - Caller is not the platform admin
    /// * `TournamentError::InvalidStatus` - Tournament already ended or cancelled
    pub fn emergency_cancel(&mut self, caller: PlayerId) -> TournamentResult<StatusTransition> {
        if caller != self.platform_admin {
            log::warn!(
                "Tournament {}: emergency cancel by unauthorized caller {}",
                self.id,
                caller
            );
            return Err(TournamentError::Unauthorized(caller));
        }
        if self.state.status.is_terminal() {
            return Err(TournamentError::InvalidStatus {
                actual: self.state.status,
            });
        }

        log::warn!("Tournament {}: emergency cancel", self.id);
        Ok(self.set_status(TournamentStatus::Cancelled))
    }

    fn set_status(&mut self, to: TournamentStatus) -> StatusTransition {
        let transition = StatusTransition {
            from: self.state.status,
            to,
        };
        self.state.status = to;
        log::info!("Tournament {}: {}", self.id, transition);
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::rules::Rules;

    fn tournament(start: Timestamp) -> Tournament {
        let mut rules = Rules::standard("USDC", start);
        rules.duration = 1000;
        rules.start_player_count = 0;
        rules.min_players = 0;
        Tournament::new(1, rules, 10, 99, 98).unwrap()
    }

    #[test]
    fn test_evaluate_before_start_is_noop() {
        let mut t = tournament(100);
        assert_eq!(t.evaluate(99).unwrap(), None);
        assert_eq!(t.status(), TournamentStatus::Open);
    }

    #[test]
    fn test_start_and_end() {
        let mut t = tournament(100);

        let started = t.evaluate(150).unwrap().unwrap();
        assert_eq!(started.from, TournamentStatus::Open);
        assert_eq!(started.to, TournamentStatus::Active);
        assert_eq!(t.state().started_at, Some(150));
        assert_eq!(t.state().ended_at, Some(1150));

        assert_eq!(t.evaluate(1149).unwrap(), None);
        let ended = t.evaluate(1150).unwrap().unwrap();
        assert_eq!(ended.to, TournamentStatus::Ended);

        // Terminal
        assert_eq!(t.evaluate(u64::MAX).unwrap(), None);
    }

    #[test]
    fn test_pending_start_never_observable() {
        let mut t = tournament(100);
        t.rules.start_player_count = 1;

        let transition = t.evaluate(100).unwrap().unwrap();
        assert_eq!(transition.from, TournamentStatus::Open);
        assert_eq!(transition.to, TournamentStatus::Cancelled);
        assert_ne!(t.status(), TournamentStatus::PendingStart);
    }

    #[test]
    fn test_end_overflow_leaves_state() {
        let mut t = tournament(0);
        let err = t.evaluate(u64::MAX).unwrap_err();
        assert!(matches!(err, TournamentError::ArithmeticOverflow));
        assert_eq!(t.status(), TournamentStatus::Open);
    }

    #[test]
    fn test_emergency_cancel_requires_admin() {
        let mut t = tournament(100);
        assert!(matches!(
            t.emergency_cancel(10),
            Err(TournamentError::Unauthorized(10))
        ));

        let transition = t.emergency_cancel(99).unwrap();
        assert_eq!(transition.to, TournamentStatus::Cancelled);
        assert!(matches!(
            t.emergency_cancel(99),
            Err(TournamentError::InvalidStatus {
                actual: TournamentStatus::Cancelled
            })
        ));
    }
}
