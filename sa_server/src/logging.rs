//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; the subscriber installed here
//! also captures those records, so both end up in the same output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var and default to
/// `info` with HTTP internals quieted.
///
/// # Example
///
/// ```no_run
/// use sa_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `user_id` - Optional participant ID
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use sa_server::logging::log_security_event;
///
/// log_security_event("forbidden_role", Some(123), "Platform role required");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<i64>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        "SECURITY: {}",
        message
    );
}

/// Log a tournament status change
pub fn log_transition(tournament_id: i64, from: &str, to: &str) {
    tracing::info!(
        tournament_id = tournament_id,
        from = from,
        to = to,
        "Tournament transition"
    );
}
