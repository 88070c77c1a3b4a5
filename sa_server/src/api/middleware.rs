//! Authentication middleware for protected endpoints.
//!
//! Validates the bearer token and injects the authenticated [`Caller`] into
//! request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use stake_arena::auth::Caller;
//!
//! async fn protected_handler(Extension(caller): Extension<Caller>) -> String {
//!     format!("Authenticated as participant {}", caller.id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::logging;

/// Authentication middleware that validates JWT tokens and injects the caller.
///
/// # Behavior
///
/// - **Success**: Token valid → Injects `Caller` into request extensions → Calls next handler
/// - **Missing header or wrong scheme**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    match state.auth_manager.verify_access_token(token) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            Ok(next.run(request).await)
        }
        Err(e) => {
            logging::log_security_event("invalid_token", None, &e.to_string());
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
