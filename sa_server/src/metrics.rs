//! Prometheus metrics for monitoring tournament activity.
//!
//! Metrics are exposed in Prometheus text format by a dedicated listener,
//! enabled with `METRICS_BIND`. Without an installed recorder every call
//! below is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sa_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::tournaments_created_total();
//! metrics::player_actions_total("join");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use stake_arena::{Amount, tournament::StatusTransition, wallet::EntryType};
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Increment tournaments created counter.
pub fn tournaments_created_total() {
    metrics::counter!("tournaments_created_total").increment(1);
}

/// Record a status transition.
pub fn tournament_transitions_total(transition: &StatusTransition) {
    metrics::counter!("tournament_transitions_total",
        "from" => transition.from.to_string(),
        "to" => transition.to.to_string()
    )
    .increment(1);
}

/// Increment player actions counter (join, withdraw, forfeit, exit).
pub fn player_actions_total(action: &'static str) {
    metrics::counter!("player_actions_total", "action" => action).increment(1);
}

/// Record a payout out of escrow.
pub fn payouts_total(kind: EntryType, amount: Amount) {
    let kind = format!("{:?}", kind);
    metrics::counter!("payouts_total", "kind" => kind.clone()).increment(1);
    metrics::histogram!("payout_amount", "kind" => kind).record(amount as f64);
}

/// Set the number of tournaments swept by the last evaluator run.
pub fn evaluator_transitions(count: usize) {
    metrics::gauge!("evaluator_last_transitions").set(count as f64);
}
