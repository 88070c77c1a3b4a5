//! Tournament repository keyed by tournament id.

use super::{
    errors::{TournamentError, TournamentResult},
    instance::Tournament,
    ledger::Withdrawal,
    models::{
        Amount, Payout, PlayerId, PlayerRecord, PrizePreview, StatusTransition, Timestamp,
        TournamentId, TournamentInfo, TournamentStatus, TransitionOutcome,
    },
    rules::Rules,
};
use crate::{
    standings::{PlayerStanding, StandingDelta, StandingOracle},
    wallet::Escrow,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Shared handle to one tournament
type TournamentHandle = Arc<RwLock<Tournament>>;

/// Tournament manager owning every tournament of the platform
///
/// Each tournament sits behind its own lock: mutations on one tournament are
/// serialized, while different tournaments proceed independently. Read
/// operations return owned snapshots taken under the read lock.
#[derive(Clone)]
pub struct TournamentManager {
    /// Live tournaments
    tournaments: Arc<RwLock<HashMap<TournamentId, TournamentHandle>>>,

    /// Next tournament ID
    next_tournament_id: Arc<RwLock<TournamentId>>,

    /// Token custody
    escrow: Arc<dyn Escrow>,

    /// Combat outcomes used for exit eligibility, dropped once a tournament
    /// is over
    standings: Arc<dyn StandingOracle>,

    /// May emergency-cancel and collect platform fees
    platform_admin: PlayerId,

    /// Receives platform fees
    platform_treasury: PlayerId,
}

impl TournamentManager {
    /// Create a new tournament manager
    ///
    /// # Arguments
    ///
    /// * `escrow` - Transfer primitive for stakes and payouts
    /// * `standings` - Source of exit-eligibility inputs
    /// * `platform_admin` - Platform role identity
    /// * `platform_treasury` - Platform fee recipient
    pub fn new(
        escrow: Arc<dyn Escrow>,
        standings: Arc<dyn StandingOracle>,
        platform_admin: PlayerId,
        platform_treasury: PlayerId,
    ) -> Self {
        Self {
            tournaments: Arc::new(RwLock::new(HashMap::new())),
            next_tournament_id: Arc::new(RwLock::new(1)),
            escrow,
            standings,
            platform_admin,
            platform_treasury,
        }
    }

    /// Create a new tournament
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidRules` - Rule validation failed
    pub async fn create_tournament(
        &self,
        creator: PlayerId,
        rules: Rules,
    ) -> TournamentResult<TournamentId> {
        let mut next_id = self.next_tournament_id.write().await;
        let id = *next_id;

        let tournament = Tournament::new(
            id,
            rules,
            creator,
            self.platform_admin,
            self.platform_treasury,
        )?;

        self.tournaments
            .write()
            .await
            .insert(id, Arc::new(RwLock::new(tournament)));
        *next_id += 1;

        log::info!("Created tournament {} by creator {}", id, creator);
        Ok(id)
    }

    async fn handle(&self, tournament_id: TournamentId) -> TournamentResult<TournamentHandle> {
        self.tournaments
            .read()
            .await
            .get(&tournament_id)
            .cloned()
            .ok_or(TournamentError::NotFound(tournament_id))
    }

    fn after_transition(&self, tournament_id: TournamentId, transition: &StatusTransition) {
        if transition.to.is_terminal() {
            self.standings.clear_tournament(tournament_id);
        }
    }

    /// Join a tournament
    ///
    /// The start time is evaluated first, under the same lock, so a join
    /// arriving after `start_timestamp` cannot slip into a tournament that
    /// should already have started or been cancelled.
    ///
    /// # Returns
    ///
    /// * `TransitionOutcome` - Status after the join, with `Open -> Locked` if it filled the tournament
    pub async fn join(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        stake: Amount,
        now: Timestamp,
    ) -> TournamentResult<TransitionOutcome> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;

        if let Some(transition) = tournament.evaluate(now)? {
            self.after_transition(tournament_id, &transition);
        }
        let transition = tournament.join(player_id, stake, now, self.escrow.as_ref())?;

        Ok(TransitionOutcome {
            status: tournament.status(),
            transition,
        })
    }

    /// Withdraw with a full refund
    pub async fn withdraw(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<Withdrawal> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        tournament.withdraw(player_id, self.escrow.as_ref())
    }

    /// Forfeit with a penalty
    pub async fn forfeit(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        now: Timestamp,
    ) -> TournamentResult<Payout> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        tournament.forfeit(player_id, now, self.escrow.as_ref())
    }

    /// Exit as a winner using the latest reported standing
    ///
    /// Players the combat service never reported on keep their initial
    /// lives and coins.
    pub async fn exit(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        now: Timestamp,
    ) -> TournamentResult<()> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        let standing = match self.standings.standing(tournament_id, player_id) {
            Some(standing) => standing,
            None => tournament.initial_standing(player_id)?,
        };
        tournament.exit(player_id, &standing, now)
    }

    /// Advance one tournament's state machine
    pub async fn evaluate(
        &self,
        tournament_id: TournamentId,
        now: Timestamp,
    ) -> TournamentResult<TransitionOutcome> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        let transition = tournament.evaluate(now)?;
        if let Some(transition) = &transition {
            self.after_transition(tournament_id, transition);
        }

        Ok(TransitionOutcome {
            status: tournament.status(),
            transition,
        })
    }

    /// Advance every non-terminal tournament
    ///
    /// Failures are logged and skipped so one tournament cannot stall the rest.
    ///
    /// # Returns
    ///
    /// * `Vec<(TournamentId, StatusTransition)>` - Transitions performed, by tournament ID
    pub async fn evaluate_all(&self, now: Timestamp) -> Vec<(TournamentId, StatusTransition)> {
        let handles: Vec<(TournamentId, TournamentHandle)> = {
            let tournaments = self.tournaments.read().await;
            let mut handles: Vec<_> = tournaments
                .iter()
                .map(|(id, handle)| (*id, Arc::clone(handle)))
                .collect();
            handles.sort_by_key(|(id, _)| *id);
            handles
        };

        let mut transitions = Vec::new();
        for (id, handle) in handles {
            let mut tournament = handle.write().await;
            if tournament.status().is_terminal() {
                continue;
            }
            match tournament.evaluate(now) {
                Ok(Some(transition)) => {
                    self.after_transition(id, &transition);
                    transitions.push((id, transition));
                }
                Ok(None) => {}
                Err(e) => log::error!("Failed to evaluate tournament {}: {}", id, e),
            }
        }

        transitions
    }

    /// Pay a winner's prize share
    pub async fn claim_prize(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<Payout> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        tournament.claim_prize(player_id, self.escrow.as_ref())
    }

    /// Pay the creator fee
    pub async fn collect_creator_fees(
        &self,
        tournament_id: TournamentId,
        caller: PlayerId,
    ) -> TournamentResult<Payout> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        tournament.collect_creator_fees(caller, self.escrow.as_ref())
    }

    /// Pay the platform fee to the treasury
    pub async fn collect_platform_fees(
        &self,
        tournament_id: TournamentId,
        caller: PlayerId,
    ) -> TournamentResult<Payout> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        tournament.collect_platform_fees(caller, self.escrow.as_ref())
    }

    /// Force a tournament into `Cancelled`
    pub async fn emergency_cancel(
        &self,
        tournament_id: TournamentId,
        caller: PlayerId,
    ) -> TournamentResult<StatusTransition> {
        let handle = self.handle(tournament_id).await?;
        let mut tournament = handle.write().await;
        let transition = tournament.emergency_cancel(caller)?;
        self.after_transition(tournament_id, &transition);
        Ok(transition)
    }

    /// Get tournament information
    pub async fn get_tournament_info(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<TournamentInfo> {
        let handle = self.handle(tournament_id).await?;
        let tournament = handle.read().await;
        Ok(tournament.info())
    }

    /// List tournaments ordered by ID, optionally filtered by status
    pub async fn list_tournaments(&self, status: Option<TournamentStatus>) -> Vec<TournamentInfo> {
        let handles: Vec<TournamentHandle> =
            self.tournaments.read().await.values().cloned().collect();

        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            let tournament = handle.read().await;
            if status.is_none_or(|s| tournament.status() == s) {
                infos.push(tournament.info());
            }
        }
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Get a player's record
    pub async fn get_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<PlayerRecord> {
        let handle = self.handle(tournament_id).await?;
        let tournament = handle.read().await;
        tournament.player(player_id).cloned()
    }

    /// Get the winner set in join order
    pub async fn get_winners(&self, tournament_id: TournamentId) -> TournamentResult<Vec<PlayerId>> {
        let handle = self.handle(tournament_id).await?;
        let tournament = handle.read().await;
        Ok(tournament.winners())
    }

    /// Current settlement figures
    pub async fn prize_preview(&self, tournament_id: TournamentId) -> TournamentResult<PrizePreview> {
        let handle = self.handle(tournament_id).await?;
        let tournament = handle.read().await;
        tournament.settlement_summary()
    }

    /// Record a combat outcome for a joined player
    ///
    /// The first report starts from the player's initial lives and coins.
    /// The tournament lock is held throughout, so a report cannot outlive
    /// the clearing that follows a terminal transition.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotFound` - Unknown tournament
    /// * `TournamentError::InvalidStatus` - Tournament already over
    /// * `TournamentError::PlayerNotFound` - Player never joined
    pub async fn report_standing(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        delta: &StandingDelta,
    ) -> TournamentResult<PlayerStanding> {
        let handle = self.handle(tournament_id).await?;
        let tournament = handle.read().await;
        if tournament.status().is_terminal() {
            return Err(TournamentError::InvalidStatus {
                actual: tournament.status(),
            });
        }

        let initial = tournament.initial_standing(player_id)?;
        Ok(self
            .standings
            .apply_delta(tournament_id, player_id, initial, delta))
    }
}
