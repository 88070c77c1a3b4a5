//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Signing secret unusable
    #[error("Invalid JWT secret: {0}")]
    InvalidSecret(String),

    /// Caller lacks the role required by the operation
    #[error("Role {0} required")]
    Forbidden(super::models::Role),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// JWT errors are sanitized to prevent information disclosure about the
    /// token structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            AuthError::InvalidSecret(_) => "Internal server error".to_string(),
            AuthError::Forbidden(_) => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
