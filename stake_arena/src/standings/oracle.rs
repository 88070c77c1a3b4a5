//! Standing store seam and its in-memory implementation.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use super::models::{PlayerStanding, StandingDelta};
use crate::tournament::models::{PlayerId, TournamentId};

/// Store of exit-eligibility inputs for the tournament engine
///
/// The engine never computes combat outcomes. It records what the combat
/// service reports, reads standings on exit and drops them once the
/// tournament is over.
pub trait StandingOracle: Send + Sync {
    /// Latest standing, or `None` if the combat service reported nothing yet
    fn standing(&self, tournament_id: TournamentId, player_id: PlayerId) -> Option<PlayerStanding>;

    /// Apply a combat outcome on top of the current standing
    ///
    /// # Arguments
    ///
    /// * `initial` - Starting standing if nothing was reported yet
    ///
    /// # Returns
    ///
    /// * `PlayerStanding` - The updated standing
    fn apply_delta(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        initial: PlayerStanding,
        delta: &StandingDelta,
    ) -> PlayerStanding;

    /// Forget every standing of a tournament that reached a terminal status
    fn clear_tournament(&self, tournament_id: TournamentId);
}

/// Standings as reported by the combat service
#[derive(Debug, Default)]
pub struct StandingBook {
    standings: RwLock<HashMap<(TournamentId, PlayerId), PlayerStanding>>,
}

impl StandingBook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StandingOracle for StandingBook {
    fn standing(&self, tournament_id: TournamentId, player_id: PlayerId) -> Option<PlayerStanding> {
        self.standings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(tournament_id, player_id))
            .copied()
    }

    fn apply_delta(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        initial: PlayerStanding,
        delta: &StandingDelta,
    ) -> PlayerStanding {
        let mut standings = self.standings.write().unwrap_or_else(PoisonError::into_inner);
        let standing = standings
            .entry((tournament_id, player_id))
            .or_insert(initial);
        standing.apply(delta);
        *standing
    }

    fn clear_tournament(&self, tournament_id: TournamentId) {
        self.standings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(tid, _), _| *tid != tournament_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreported_player() {
        let book = StandingBook::new();
        assert_eq!(book.standing(1, 2), None);
    }

    #[test]
    fn test_delta_starts_from_initial_standing() {
        let book = StandingBook::new();
        let standing = book.apply_delta(
            1,
            2,
            PlayerStanding::new(5, 500),
            &StandingDelta {
                lives: -1,
                coins: 10,
                objective_completed: false,
            },
        );
        assert_eq!(standing.lives, 4);
        assert_eq!(standing.coins, 510);
        assert_eq!(book.standing(1, 2), Some(standing));
        assert_eq!(book.standing(2, 2), None);
    }

    #[test]
    fn test_clear_tournament() {
        let book = StandingBook::new();
        let objective = StandingDelta {
            objective_completed: true,
            ..StandingDelta::default()
        };
        book.apply_delta(1, 2, PlayerStanding::new(5, 0), &objective);
        book.apply_delta(3, 2, PlayerStanding::new(1, 0), &StandingDelta::default());

        book.clear_tournament(1);
        assert_eq!(book.standing(1, 2), None);
        assert!(book.standing(3, 2).is_some());
    }
}
