//! Background sweep advancing tournaments on wall-clock time.
//!
//! The engine itself is clock-free; this task feeds it the current Unix time
//! so tournaments start, cancel and end even when nobody calls `evaluate`.

use std::{sync::Arc, time::Duration};

use stake_arena::{Timestamp, TournamentManager};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::{api::unix_now, logging, metrics};

/// Run one sweep over every tournament
///
/// # Returns
///
/// * `usize` - Number of transitions performed
pub async fn sweep(manager: &TournamentManager, now: Timestamp) -> usize {
    let transitions = manager.evaluate_all(now).await;

    for (tournament_id, transition) in &transitions {
        logging::log_transition(
            *tournament_id,
            &transition.from.to_string(),
            &transition.to.to_string(),
        );
        metrics::tournament_transitions_total(transition);
    }
    metrics::evaluator_transitions(transitions.len());

    transitions.len()
}

/// Spawn the periodic evaluator
///
/// Missed ticks are skipped rather than replayed; a single sweep with the
/// current time covers any backlog.
pub fn spawn_evaluator(manager: Arc<TournamentManager>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Tournament evaluator running every {:?}", period);
        loop {
            ticker.tick().await;
            let count = sweep(&manager, unix_now()).await;
            if count > 0 {
                tracing::debug!("Evaluator performed {} transition(s)", count);
            }
        }
    })
}
