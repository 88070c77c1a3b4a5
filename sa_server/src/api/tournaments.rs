//! Tournament API handlers.
//!
//! Player actions always act on the authenticated caller; there is no way to
//! join, withdraw or claim on someone else's behalf.
//!
//! # Examples
//!
//! List open tournaments:
//! ```bash
//! curl 'http://localhost:6969/api/v1/tournaments?status=open'
//! ```
//!
//! Join a tournament:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments/1/join \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"stake": 100}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use stake_arena::{
    Amount, PlayerId, Rules, Timestamp, TournamentId, TournamentStatus,
    auth::{AuthManager, Caller, Role},
    standings::{PlayerStanding, StandingDelta},
    tournament::{
        Payout, PlayerRecord, PrizePreview, StatusTransition, TournamentInfo, TransitionOutcome,
    },
    wallet::EntryType,
};

use super::{
    ApiError, AppState, auth_error, request_id::RequestId, tournament_error, unix_now,
};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<TournamentStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: TournamentId,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub stake: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub refund: Payout,
    pub transition: Option<StatusTransition>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateQuery {
    /// Clock override, honored for the platform role only
    pub now: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WinnersResponse {
    pub winners: Vec<PlayerId>,
}

fn record_transition(tournament_id: TournamentId, transition: Option<&StatusTransition>) {
    if let Some(transition) = transition {
        logging::log_transition(
            tournament_id,
            &transition.from.to_string(),
            &transition.to.to_string(),
        );
        metrics::tournament_transitions_total(transition);
    }
}

/// List tournaments, optionally filtered by `?status=`.
///
/// Returns `200 OK` with tournament snapshots ordered by ID.
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<TournamentInfo>> {
    Json(state.tournament_manager.list_tournaments(query.status).await)
}

/// Get a tournament snapshot.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentInfo>, ApiError> {
    state
        .tournament_manager
        .get_tournament_info(tournament_id)
        .await
        .map(Json)
        .map_err(tournament_error)
}

pub async fn get_winners(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<WinnersResponse>, ApiError> {
    let winners = state
        .tournament_manager
        .get_winners(tournament_id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(WinnersResponse { winners }))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path((tournament_id, player_id)): Path<(TournamentId, PlayerId)>,
) -> Result<Json<PlayerRecord>, ApiError> {
    state
        .tournament_manager
        .get_player(tournament_id, player_id)
        .await
        .map(Json)
        .map_err(tournament_error)
}

/// Current settlement figures: pool, fees, per-winner share and remainder.
pub async fn get_prize(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<PrizePreview>, ApiError> {
    state
        .tournament_manager
        .prize_preview(tournament_id)
        .await
        .map(Json)
        .map_err(tournament_error)
}

/// Create a tournament owned by the caller.
///
/// # Request Body
///
/// A complete rule set (see [`Rules`]).
///
/// # Response
///
/// Returns `201 Created` with `{"id": <tournament_id>}`.
///
/// # Errors
///
/// - `400 Bad Request`: Rule validation failed; the message names the field
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    request_id: RequestId,
    Json(rules): Json<Rules>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state
        .tournament_manager
        .create_tournament(caller.id, rules)
        .await
        .map_err(tournament_error)?;

    metrics::tournaments_created_total();
    tracing::info!(
        request_id = %request_id.as_str(),
        tournament_id = id,
        creator = caller.id,
        "Tournament created"
    );

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Join with a stake taken from the caller's wallet.
///
/// # Request Body
///
/// ```json
/// { "stake": 100 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Stake out of bounds or caller already joined
/// - `409 Conflict`: Tournament not open, including once its start time has passed
/// - `422 Unprocessable Entity`: Wallet cannot cover the stake
pub async fn join(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    let outcome = state
        .tournament_manager
        .join(tournament_id, caller.id, request.stake, unix_now())
        .await
        .map_err(tournament_error)?;

    metrics::player_actions_total("join");
    record_transition(tournament_id, outcome.transition.as_ref());
    Ok(Json(outcome))
}

/// Withdraw before start (or after cancellation) with a full refund.
///
/// # Errors
///
/// - `404 Not Found`: Caller never joined
/// - `409 Conflict`: Tournament already started, or caller already left
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let withdrawal = state
        .tournament_manager
        .withdraw(tournament_id, caller.id)
        .await
        .map_err(tournament_error)?;

    metrics::player_actions_total("withdraw");
    metrics::payouts_total(EntryType::Refund, withdrawal.refund.amount);
    record_transition(tournament_id, withdrawal.transition.as_ref());

    Ok(Json(WithdrawResponse {
        refund: withdrawal.refund,
        transition: withdrawal.transition,
    }))
}

/// Forfeit an active tournament; the refund is the stake minus the penalty.
pub async fn forfeit(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Payout>, ApiError> {
    let refund = state
        .tournament_manager
        .forfeit(tournament_id, caller.id, unix_now())
        .await
        .map_err(tournament_error)?;

    metrics::player_actions_total("forfeit");
    metrics::payouts_total(EntryType::ForfeitRefund, refund.amount);
    Ok(Json(refund))
}

/// Leave an active tournament as a winner.
///
/// Eligibility comes from the standing last reported for the caller.
///
/// # Errors
///
/// - `409 Conflict`: Not enough lives or coins, tournament not active, or caller already left
pub async fn exit(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<PlayerRecord>, ApiError> {
    let manager = &state.tournament_manager;
    manager
        .exit(tournament_id, caller.id, unix_now())
        .await
        .map_err(tournament_error)?;

    metrics::player_actions_total("exit");
    manager
        .get_player(tournament_id, caller.id)
        .await
        .map(Json)
        .map_err(tournament_error)
}

/// Advance the state machine.
///
/// Any authenticated caller may trigger evaluation at the server's clock;
/// the `?now=` override is limited to the platform role.
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<EvaluateQuery>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    let now = match query.now {
        Some(now) => {
            AuthManager::require_role(&caller, Role::Platform).map_err(|e| {
                logging::log_security_event("clock_override", Some(caller.id), &e.to_string());
                auth_error(e)
            })?;
            now
        }
        None => unix_now(),
    };

    let outcome = state
        .tournament_manager
        .evaluate(tournament_id, now)
        .await
        .map_err(tournament_error)?;
    record_transition(tournament_id, outcome.transition.as_ref());

    Ok(Json(outcome))
}

/// Claim the caller's prize share.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a winner
/// - `409 Conflict`: Tournament not ended, or share already claimed
pub async fn claim_prize(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Payout>, ApiError> {
    let payout = state
        .tournament_manager
        .claim_prize(tournament_id, caller.id)
        .await
        .map_err(tournament_error)?;

    metrics::payouts_total(EntryType::Prize, payout.amount);
    Ok(Json(payout))
}

pub async fn collect_creator_fees(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Payout>, ApiError> {
    let payout = state
        .tournament_manager
        .collect_creator_fees(tournament_id, caller.id)
        .await
        .map_err(tournament_error)?;

    metrics::payouts_total(EntryType::CreatorFee, payout.amount);
    Ok(Json(payout))
}

/// Pay the platform fee to the treasury. Platform role only.
pub async fn collect_platform_fees(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Payout>, ApiError> {
    require_platform(&caller, "collect_platform_fees")?;

    let payout = state
        .tournament_manager
        .collect_platform_fees(tournament_id, caller.id)
        .await
        .map_err(tournament_error)?;

    metrics::payouts_total(EntryType::PlatformFee, payout.amount);
    Ok(Json(payout))
}

/// Force a non-terminal tournament into `cancelled`. Platform role only.
///
/// Every remaining participant can then withdraw their full stake.
pub async fn emergency_cancel(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<StatusTransition>, ApiError> {
    require_platform(&caller, "emergency_cancel")?;

    let transition = state
        .tournament_manager
        .emergency_cancel(tournament_id, caller.id)
        .await
        .map_err(tournament_error)?;

    logging::log_security_event(
        "emergency_cancel",
        Some(caller.id),
        &format!("Tournament {} cancelled", tournament_id),
    );
    record_transition(tournament_id, Some(&transition));
    Ok(Json(transition))
}

/// Record a combat outcome for a participant. Platform role only.
///
/// # Request Body
///
/// Signed changes applied on top of the current standing:
/// ```json
/// { "lives": -1, "coins": 25, "objective_completed": false }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller lacks the platform role
/// - `404 Not Found`: Unknown tournament or participant
/// - `409 Conflict`: Tournament already ended or cancelled
pub async fn report_standing(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((tournament_id, player_id)): Path<(TournamentId, PlayerId)>,
    Json(delta): Json<StandingDelta>,
) -> Result<Json<PlayerStanding>, ApiError> {
    require_platform(&caller, "report_standing")?;

    let standing = state
        .tournament_manager
        .report_standing(tournament_id, player_id, &delta)
        .await
        .map_err(tournament_error)?;
    tracing::debug!(
        tournament_id = tournament_id,
        player_id = player_id,
        lives = standing.lives,
        coins = standing.coins,
        "Standing updated"
    );

    Ok(Json(standing))
}

fn require_platform(caller: &Caller, operation: &str) -> Result<(), ApiError> {
    AuthManager::require_role(caller, Role::Platform).map_err(|e| {
        logging::log_security_event(
            "forbidden_role",
            Some(caller.id),
            &format!("{} requires the platform role", operation),
        );
        auth_error(e)
    })
}
