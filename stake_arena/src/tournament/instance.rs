//! The per-tournament aggregate.
//!
//! A [`Tournament`] owns its rules, aggregate state and player records. The
//! operations that mutate it are split by concern across `lifecycle`,
//! `ledger` and `settlement`; this file holds construction and read-only views.

use std::collections::HashMap;

use super::{
    errors::{TournamentError, TournamentResult},
    models::{
        Amount, PlayerId, PlayerRecord, PlayerStatus, TournamentId, TournamentInfo,
        TournamentState, TournamentStatus,
    },
    rules::Rules,
};
use crate::wallet::{EntryType, Escrow};

/// A single staked tournament
#[derive(Debug, Clone)]
pub struct Tournament {
    pub(super) id: TournamentId,
    pub(super) rules: Rules,
    pub(super) creator: PlayerId,
    pub(super) platform_admin: PlayerId,
    pub(super) platform_treasury: PlayerId,
    pub(super) state: TournamentState,
    pub(super) players: HashMap<PlayerId, PlayerRecord>,
    /// Player ids in first-join order
    pub(super) roster: Vec<PlayerId>,
}

impl Tournament {
    /// Create a new tournament in `Open` status
    ///
    /// # Arguments
    ///
    /// * `id` - Tournament ID assigned by the repository
    /// * `rules` - Rule set, validated here
    /// * `creator` - Receives the creator fee
    /// * `platform_admin` - May emergency-cancel and collect the platform fee
    /// * `platform_treasury` - Receives the platform fee
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidRules` - Rule validation failed
    pub fn new(
        id: TournamentId,
        rules: Rules,
        creator: PlayerId,
        platform_admin: PlayerId,
        platform_treasury: PlayerId,
    ) -> TournamentResult<Self> {
        rules.validate()?;

        Ok(Self {
            id,
            rules,
            creator,
            platform_admin,
            platform_treasury,
            state: TournamentState::default(),
            players: HashMap::new(),
            roster: Vec::new(),
        })
    }

    pub fn id(&self) -> TournamentId {
        self.id
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn creator(&self) -> PlayerId {
        self.creator
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn status(&self) -> TournamentStatus {
        self.state.status
    }

    pub fn player_count(&self) -> u32 {
        self.state.player_count
    }

    /// Get a player's record
    ///
    /// # Errors
    ///
    /// * `TournamentError::PlayerNotFound` - Player never joined
    pub fn player(&self, player_id: PlayerId) -> TournamentResult<&PlayerRecord> {
        self.players
            .get(&player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))
    }

    /// Winners in join order, claimed or not
    pub fn winners(&self) -> Vec<PlayerId> {
        self.records()
            .filter(|record| record.status.is_winner())
            .map(|record| record.player_id)
            .collect()
    }

    pub fn winner_count(&self) -> usize {
        self.records()
            .filter(|record| record.status.is_winner())
            .count()
    }

    /// Records in join order
    pub fn records(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.roster.iter().filter_map(|id| self.players.get(id))
    }

    /// Funds the tournament should still hold in escrow
    pub fn escrow_balance(&self) -> Amount {
        let paid = self
            .state
            .refunded_amount
            .saturating_add(self.state.prizes_paid)
            .saturating_add(self.state.fees_paid);
        self.state.total_pool_amount.saturating_sub(paid)
    }

    /// Snapshot for external callers
    pub fn info(&self) -> TournamentInfo {
        TournamentInfo {
            id: self.id,
            rules: self.rules.clone(),
            creator: self.creator,
            state: self.state.clone(),
            winner_count: self.winner_count(),
            escrow_balance: self.escrow_balance(),
        }
    }

    /// Fail with `InvalidStatus` unless the tournament is in `expected`
    pub(super) fn require_status(&self, expected: TournamentStatus) -> TournamentResult<()> {
        if self.state.status != expected {
            return Err(TournamentError::InvalidStatus {
                actual: self.state.status,
            });
        }
        Ok(())
    }

    /// Move a record to `to`, enforcing the legal transition table
    pub(super) fn transition_player(
        &mut self,
        player_id: PlayerId,
        to: PlayerStatus,
    ) -> TournamentResult<()> {
        let record = self
            .players
            .get_mut(&player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        if !record.status.can_transition_to(to) {
            return Err(TournamentError::InvalidPlayerState {
                player_id,
                from: record.status,
                to,
            });
        }
        record.status = to;
        Ok(())
    }

    /// Pull `amount` from `payer` into this tournament's escrow
    pub(super) fn escrow_in(
        &self,
        escrow: &dyn Escrow,
        payer: PlayerId,
        amount: Amount,
        kind: EntryType,
    ) -> TournamentResult<()> {
        if amount == 0 {
            return Ok(());
        }
        escrow
            .transfer_in(self.id, payer, amount, kind)
            .map_err(|e| {
                log::warn!(
                    "Tournament {}: {} of {} from {} rejected: {}",
                    self.id,
                    kind,
                    amount,
                    payer,
                    e
                );
                TournamentError::from(e)
            })
    }

    /// Pay `amount` out of this tournament's escrow to `payee`
    pub(super) fn escrow_out(
        &self,
        escrow: &dyn Escrow,
        payee: PlayerId,
        amount: Amount,
        kind: EntryType,
    ) -> TournamentResult<()> {
        if amount == 0 {
            return Ok(());
        }
        escrow
            .transfer_out(self.id, payee, amount, kind)
            .map_err(|e| {
                log::warn!(
                    "Tournament {}: {} of {} to {} rejected: {}",
                    self.id,
                    kind,
                    amount,
                    payee,
                    e
                );
                TournamentError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_rules() {
        let mut rules = Rules::standard("USDC", 100);
        rules.creator_fee_percent = 9;
        rules.platform_fee_percent = 2;

        let err = Tournament::new(1, rules, 10, 99, 98).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidRules { .. }));
    }

    #[test]
    fn test_fresh_tournament_views() {
        let t = Tournament::new(1, Rules::standard("USDC", 100), 10, 99, 98).unwrap();

        assert_eq!(t.status(), TournamentStatus::Open);
        assert_eq!(t.player_count(), 0);
        assert!(t.winners().is_empty());
        assert_eq!(t.escrow_balance(), 0);
        assert!(matches!(t.player(5), Err(TournamentError::PlayerNotFound(5))));

        let info = t.info();
        assert_eq!(info.id, 1);
        assert_eq!(info.creator, 10);
        assert_eq!(info.winner_count, 0);
    }
}
