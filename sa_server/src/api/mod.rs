//! HTTP API for the tournament server.
//!
//! # Modules
//!
//! - [`tournaments`]: Tournament lifecycle, stakes and settlement
//! - [`wallets`]: Wallet funding and balances
//! - [`middleware`]: Authentication middleware for protected endpoints
//! - [`request_id`]: Request correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                                       - Health check (public)
//! GET  /api/v1/tournaments?status=<status>           - List tournaments (public)
//! GET  /api/v1/tournaments/{id}                      - Tournament details (public)
//! GET  /api/v1/tournaments/{id}/winners              - Winner set (public)
//! GET  /api/v1/tournaments/{id}/players/{player_id}  - Player record (public)
//! GET  /api/v1/tournaments/{id}/prize                - Settlement figures (public)
//! POST /api/v1/tournaments                           - Create tournament
//! POST /api/v1/tournaments/{id}/join                 - Join with a stake
//! POST /api/v1/tournaments/{id}/withdraw             - Full refund before start
//! POST /api/v1/tournaments/{id}/forfeit              - Partial refund while active
//! POST /api/v1/tournaments/{id}/exit                 - Leave as a winner
//! POST /api/v1/tournaments/{id}/evaluate             - Advance the state machine
//! POST /api/v1/tournaments/{id}/claim                - Claim prize share
//! POST /api/v1/tournaments/{id}/cancel               - Emergency cancel (platform)
//! POST /api/v1/tournaments/{id}/fees/creator         - Collect creator fee
//! POST /api/v1/tournaments/{id}/fees/platform        - Collect platform fee (platform)
//! POST /api/v1/tournaments/{id}/standings/{player_id} - Report combat outcome (platform)
//! GET  /api/v1/wallet                                - Caller's wallet
//! POST /api/v1/wallets/{user_id}/deposit             - Fund a wallet (platform)
//! ```
//!
//! Every POST except health requires `Authorization: Bearer <token>`.
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod middleware;
pub mod request_id;
pub mod tournaments;
pub mod wallets;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use stake_arena::{
    Timestamp, TournamentError, TournamentManager,
    auth::{AuthError, AuthManager},
    tournament::ErrorKind,
    wallet::{WalletError, WalletManager},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub tournament_manager: Arc<TournamentManager>,
    pub wallet_manager: Arc<WalletManager>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error type
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map an engine error onto an HTTP status by category
pub(crate) fn tournament_error(e: TournamentError) -> ApiError {
    let status = match e.kind() {
        ErrorKind::State | ErrorKind::Idempotency => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Escrow => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Tournament operation failed: {}", e);
    }
    api_error(status, e.client_message())
}

pub(crate) fn wallet_error(e: WalletError) -> ApiError {
    let status = match e {
        WalletError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        WalletError::WalletNotFound(_) | WalletError::EscrowNotFound(_) => StatusCode::NOT_FOUND,
        WalletError::InsufficientBalance { .. } | WalletError::EscrowUnderfunded { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WalletError::Overflow | WalletError::TransactionFailed(_) => {
            tracing::error!("Wallet operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e.client_message())
}

pub(crate) fn auth_error(e: AuthError) -> ApiError {
    let status = match e {
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::JwtError(_) => StatusCode::UNAUTHORIZED,
        AuthError::InvalidSecret(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.client_message())
}

/// Current Unix time in seconds
pub fn unix_now() -> Timestamp {
    Timestamp::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use sa_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route("/tournaments/{id}/winners", get(tournaments::get_winners))
        .route(
            "/tournaments/{id}/players/{player_id}",
            get(tournaments::get_player),
        )
        .route("/tournaments/{id}/prize", get(tournaments::get_prize));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/{id}/join", post(tournaments::join))
        .route("/tournaments/{id}/withdraw", post(tournaments::withdraw))
        .route("/tournaments/{id}/forfeit", post(tournaments::forfeit))
        .route("/tournaments/{id}/exit", post(tournaments::exit))
        .route("/tournaments/{id}/evaluate", post(tournaments::evaluate))
        .route("/tournaments/{id}/claim", post(tournaments::claim_prize))
        .route("/tournaments/{id}/cancel", post(tournaments::emergency_cancel))
        .route(
            "/tournaments/{id}/fees/creator",
            post(tournaments::collect_creator_fees),
        )
        .route(
            "/tournaments/{id}/fees/platform",
            post(tournaments::collect_platform_fees),
        )
        .route(
            "/tournaments/{id}/standings/{player_id}",
            post(tournaments::report_standing),
        )
        .route("/wallet", get(wallets::get_wallet))
        .route("/wallets/{user_id}/deposit", post(wallets::deposit))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","tournaments":{"total":3,"open":1},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let tournaments = state.tournament_manager.list_tournaments(None).await;
    let open = tournaments
        .iter()
        .filter(|t| !t.state.status.is_terminal())
        .count();
    let wallets_healthy = state.wallet_manager.total_supply().is_ok();

    let status_code = if wallets_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if wallets_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "tournaments": {
            "total": tournaments.len(),
            "open": open,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
