//! Standing data models.

use serde::{Deserialize, Serialize};

/// Combat-derived position of one player in one tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub lives: u32,
    pub coins: u64,
    /// Secret objective reported complete by the combat service
    pub objective_completed: bool,
}

impl PlayerStanding {
    pub fn new(lives: u32, coins: u64) -> Self {
        Self {
            lives,
            coins,
            objective_completed: false,
        }
    }

    /// Whether this standing satisfies the exit condition
    pub fn is_exit_eligible(&self, exit_lives_required: u32) -> bool {
        self.lives >= exit_lives_required || self.objective_completed
    }

    /// Apply a combat outcome, saturating at zero and at the type bounds
    pub fn apply(&mut self, delta: &StandingDelta) {
        self.lives = self.lives.saturating_add_signed(delta.lives);
        self.coins = self.coins.saturating_add_signed(delta.coins);
        self.objective_completed |= delta.objective_completed;
    }
}

/// Outcome reported by the combat service after a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingDelta {
    #[serde(default)]
    pub lives: i32,
    #[serde(default)]
    pub coins: i64,
    #[serde(default)]
    pub objective_completed: bool,
}
