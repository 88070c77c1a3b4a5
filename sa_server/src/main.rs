//! Staked tournament server.
//!
//! Serves the tournament engine over HTTP and runs the background evaluator
//! that moves tournaments through their lifecycle.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Error, anyhow};
use log::info;
use pico_args::Arguments;
use sa_server::{api, config::ServerConfig, evaluator, logging, metrics};
use stake_arena::{
    PlayerId, TournamentManager,
    auth::{AuthManager, Role},
    standings::StandingBook,
    wallet::WalletManager,
};

const HELP: &str = "\
Run the staked tournament server

USAGE:
  sa_server [OPTIONS]

OPTIONS:
  --bind           IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --metrics-bind   IP:PORT  Prometheus exporter address  [default: env METRICS_BIND, disabled if unset]
  --issue-token    ID       Print an access token for participant ID and exit
  --role           ROLE     Role of the issued token: player or platform  [default: player]

FLAGS:
  -h, --help                Print help information

ENVIRONMENT:
  SERVER_BIND               Server bind address (e.g., 0.0.0.0:8080)
  JWT_SECRET                JWT signing secret, at least 32 characters
  PLATFORM_ADMIN_ID         Participant ID acting as platform operator
  PLATFORM_TREASURY_ID      Participant ID receiving platform fees [default: admin]
  EVALUATE_INTERVAL_SECS    Seconds between lifecycle sweeps [default: 5]
  METRICS_BIND              Prometheus exporter address
  RUST_LOG                  Log filter [default: info]
";

struct Args {
    bind: Option<SocketAddr>,
    metrics_bind: Option<SocketAddr>,
    issue_token: Option<PlayerId>,
    role: Role,
}

fn parse_role(value: &str) -> Result<Role, String> {
    match value.to_lowercase().as_str() {
        "player" => Ok(Role::Player),
        "platform" => Ok(Role::Platform),
        other => Err(format!("unknown role '{other}'")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
        issue_token: pargs.opt_value_from_str("--issue-token")?,
        role: pargs
            .opt_value_from_fn("--role", parse_role)?
            .unwrap_or(Role::Player),
    };

    let config = ServerConfig::from_env(args.bind, args.metrics_bind)?;
    let auth_manager = Arc::new(
        AuthManager::new(config.security.jwt_secret.clone())
            .map_err(|e| anyhow!("Failed to initialize authentication: {}", e))?,
    );

    if let Some(user_id) = args.issue_token {
        let token = auth_manager.issue_access_token(user_id, args.role)?;
        println!("{token}");
        return Ok(());
    }

    logging::init();
    info!("Starting tournament server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow!(e))?;
        info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    // Create managers
    let wallet_manager = Arc::new(WalletManager::new());
    let standings = Arc::new(StandingBook::new());
    let tournament_manager = Arc::new(TournamentManager::new(
        wallet_manager.clone(),
        standings,
        config.platform.admin_id,
        config.platform.treasury_id,
    ));
    info!(
        "Platform admin {}, treasury {}",
        config.platform.admin_id, config.platform.treasury_id
    );

    let evaluator = evaluator::spawn_evaluator(tournament_manager.clone(), config.evaluate_interval);

    let api_state = api::AppState {
        auth_manager,
        tournament_manager,
        wallet_manager,
    };
    let app = api::create_router(api_state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("Server error: {}", e))?;

    evaluator.abort();
    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
