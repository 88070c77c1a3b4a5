//! Wallet API handlers.
//!
//! Tokens enter the system only through platform deposits; everything else
//! moves between wallets and tournament escrows.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::{Deserialize, Serialize};
use stake_arena::{
    Amount, PlayerId,
    auth::{AuthManager, Caller, Role},
    wallet::WalletEntry,
};

use super::{ApiError, AppState, auth_error, wallet_error};
use crate::logging;

/// Ledger entries returned with a wallet
const RECENT_ENTRIES: usize = 20;

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: PlayerId,
    pub balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub user_id: PlayerId,
    pub balance: Amount,
    pub entries: Vec<WalletEntry>,
}

/// Get the caller's balance and most recent ledger entries.
///
/// Participants that were never funded see a zero balance.
pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallets = &state.wallet_manager;
    let balance = wallets.balance(caller.id).map_err(wallet_error)?;
    let entries = wallets
        .get_entries(caller.id, RECENT_ENTRIES)
        .map_err(wallet_error)?;

    Ok(Json(WalletResponse {
        user_id: caller.id,
        balance,
        entries,
    }))
}

/// Credit a participant's wallet. Platform role only.
///
/// # Errors
///
/// - `400 Bad Request`: Zero amount
/// - `403 Forbidden`: Caller lacks the platform role
pub async fn deposit(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<PlayerId>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    AuthManager::require_role(&caller, Role::Platform).map_err(|e| {
        logging::log_security_event("forbidden_role", Some(caller.id), "deposit denied");
        auth_error(e)
    })?;

    let balance = state
        .wallet_manager
        .deposit(user_id, request.amount)
        .map_err(wallet_error)?;
    tracing::info!(user_id = user_id, amount = %request.amount, "Wallet funded");

    Ok(Json(BalanceResponse { user_id, balance }))
}
