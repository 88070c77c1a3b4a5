//! Prize and fee distribution after a tournament ends.
//!
//! Everything is computed from the settlement pool, which is the cumulative
//! stake minus the refunds already paid out. Retained forfeit penalties are
//! part of it and so end up with the winners. Shares are recomputed on every
//! call instead of being cached, so late claims see the same numbers.

use super::{
    errors::{TournamentError, TournamentResult},
    instance::Tournament,
    ledger::{checked_add, checked_sub},
    models::{Amount, Payout, PlayerId, PlayerStatus, PrizePreview, TournamentStatus},
};
use crate::wallet::{EntryType, Escrow};

impl Tournament {
    /// Funds available for fees and prizes
    pub fn settlement_pool(&self) -> TournamentResult<Amount> {
        checked_sub(self.state.total_pool_amount, self.state.refunded_amount)
    }

    pub fn creator_fee(&self) -> TournamentResult<Amount> {
        self.fee(self.rules.creator_fee_percent)
    }

    pub fn platform_fee(&self) -> TournamentResult<Amount> {
        self.fee(self.rules.platform_fee_percent)
    }

    fn fee(&self, percent: u8) -> TournamentResult<Amount> {
        let pool = self.settlement_pool()?;
        pool.checked_mul(Amount::from(percent))
            .map(|scaled| scaled / 100)
            .ok_or(TournamentError::ArithmeticOverflow)
    }

    /// Settlement pool minus both fees
    pub fn prize_pool(&self) -> TournamentResult<Amount> {
        let after_creator = checked_sub(self.settlement_pool()?, self.creator_fee()?)?;
        checked_sub(after_creator, self.platform_fee()?)
    }

    /// Current per-winner share, rounded down; zero without winners
    pub fn prize_preview(&self) -> TournamentResult<Amount> {
        let winners = self.winner_count() as Amount;
        if winners == 0 {
            return Ok(0);
        }
        let share = self.prize_pool()? / winners;
        log::debug!(
            "Tournament {}: prize share {} for {} winners",
            self.id,
            share,
            winners
        );
        Ok(share)
    }

    /// Part of the prize pool that no winner will ever receive
    ///
    /// This is the rounding residue of the equal split, or the whole prize
    /// pool when nobody won. It stays in escrow.
    pub fn unclaimed_remainder(&self) -> TournamentResult<Amount> {
        let winners = self.winner_count() as Amount;
        let distributed = self
            .prize_preview()?
            .checked_mul(winners)
            .ok_or(TournamentError::ArithmeticOverflow)?;
        checked_sub(self.prize_pool()?, distributed)
    }

    /// All settlement figures at once
    pub fn settlement_summary(&self) -> TournamentResult<PrizePreview> {
        Ok(PrizePreview {
            settlement_pool: self.settlement_pool()?,
            creator_fee: self.creator_fee()?,
            platform_fee: self.platform_fee()?,
            winner_count: self.winner_count(),
            prize_per_winner: self.prize_preview()?,
            unclaimed_remainder: self.unclaimed_remainder()?,
        })
    }

    /// Pay a winner their share
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - Tournament not `Ended`
    /// * `TournamentError::NotWinner` - Player did not exit as a winner
    /// * `TournamentError::AlreadyClaimed` - Share already paid
    /// * `TournamentError::Escrow` - Payout transfer failed
    pub fn claim_prize(
        &mut self,
        player_id: PlayerId,
        escrow: &dyn Escrow,
    ) -> TournamentResult<Payout> {
        self.require_status(TournamentStatus::Ended)?;

        match self.players.get(&player_id).map(|record| record.status) {
            Some(PlayerStatus::Exited) => {}
            Some(PlayerStatus::PrizeClaimed) => {
                return Err(TournamentError::AlreadyClaimed(player_id));
            }
            _ => return Err(TournamentError::NotWinner(player_id)),
        }

        let share = self.prize_preview()?;
        let prizes_paid = checked_add(self.state.prizes_paid, share)?;

        self.escrow_out(escrow, player_id, share, EntryType::Prize)?;

        self.transition_player(player_id, PlayerStatus::PrizeClaimed)?;
        self.state.prizes_paid = prizes_paid;

        log::info!(
            "Tournament {}: player {} claimed prize {}",
            self.id,
            player_id,
            share
        );

        Ok(Payout {
            recipient: player_id,
            amount: share,
        })
    }

    /// Pay the creator fee to the creator
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - Tournament not `Ended`
    /// * `TournamentError::Unauthorized` - Caller is not the creator
    /// * `TournamentError::AlreadyCollected` - Fee already paid
    pub fn collect_creator_fees(
        &mut self,
        caller: PlayerId,
        escrow: &dyn Escrow,
    ) -> TournamentResult<Payout> {
        self.require_status(TournamentStatus::Ended)?;
        if caller != self.creator {
            return Err(TournamentError::Unauthorized(caller));
        }
        if self.state.creator_fee_collected {
            return Err(TournamentError::AlreadyCollected);
        }

        let fee = self.creator_fee()?;
        let fees_paid = checked_add(self.state.fees_paid, fee)?;

        self.escrow_out(escrow, self.creator, fee, EntryType::CreatorFee)?;

        self.state.creator_fee_collected = true;
        self.state.fees_paid = fees_paid;
        log::info!("Tournament {}: creator fee {} collected", self.id, fee);

        Ok(Payout {
            recipient: self.creator,
            amount: fee,
        })
    }

    /// Pay the platform fee to the platform treasury
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - Tournament not `Ended`
    /// * `TournamentError::Unauthorized` - Caller is not the platform admin
    /// * `TournamentError::AlreadyCollected` - Fee already paid
    pub fn collect_platform_fees(
        &mut self,
        caller: PlayerId,
        escrow: &dyn Escrow,
    ) -> TournamentResult<Payout> {
        self.require_status(TournamentStatus::Ended)?;
        if caller != self.platform_admin {
            return Err(TournamentError::Unauthorized(caller));
        }
        if self.state.platform_fee_collected {
            return Err(TournamentError::AlreadyCollected);
        }

        let fee = self.platform_fee()?;
        let fees_paid = checked_add(self.state.fees_paid, fee)?;

        self.escrow_out(escrow, self.platform_treasury, fee, EntryType::PlatformFee)?;

        self.state.platform_fee_collected = true;
        self.state.fees_paid = fees_paid;
        log::info!(
            "Tournament {}: platform fee {} collected to treasury {}",
            self.id,
            fee,
            self.platform_treasury
        );

        Ok(Payout {
            recipient: self.platform_treasury,
            amount: fee,
        })
    }
}
