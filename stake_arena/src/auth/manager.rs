//! Access token issuing and verification.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, Caller, Role},
};
use crate::tournament::models::PlayerId;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Shortest accepted signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Authentication manager
///
/// Issues and verifies HS256 access tokens identifying a participant and
/// their role.
#[derive(Clone)]
pub struct AuthManager {
    jwt_secret: String,
    access_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `jwt_secret` - Secret for JWT signing, at least 32 bytes
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidSecret` - Secret too short
    pub fn new(jwt_secret: String) -> AuthResult<Self> {
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidSecret(format!(
                "must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        Ok(Self {
            jwt_secret,
            access_token_duration: Duration::hours(1),
        })
    }

    /// Override the access token lifetime
    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.access_token_duration = duration;
        self
    }

    /// Issue an access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<String>` - Signed JWT
    pub fn issue_access_token(&self, user_id: PlayerId, role: Role) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            role,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify an access token
    ///
    /// # Arguments
    ///
    /// * `token` - JWT access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<Caller>` - Authenticated caller or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<Caller> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims.into())
    }

    /// Fail unless `caller` holds `role`
    pub fn require_role(caller: &Caller, role: Role) -> AuthResult<()> {
        if caller.role != role {
            return Err(AuthError::Forbidden(role));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_that_is_long_enough_for_hs256";

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            AuthManager::new("short".to_string()),
            Err(AuthError::InvalidSecret(_))
        ));
    }

    #[test]
    fn test_issue_and_verify() {
        let auth = AuthManager::new(SECRET.to_string()).unwrap();
        let token = auth.issue_access_token(42, Role::Platform).unwrap();

        let caller = auth.verify_access_token(&token).unwrap();
        assert_eq!(caller.id, 42);
        assert!(caller.is_platform());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = AuthManager::new(SECRET.to_string()).unwrap();
        let other = AuthManager::new(format!("{SECRET}_other")).unwrap();
        let token = auth.issue_access_token(1, Role::Player).unwrap();

        let err = other.verify_access_token(&token).unwrap_err();
        assert_eq!(err.client_message(), "Authentication failed");
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = AuthManager::new(SECRET.to_string())
            .unwrap()
            .with_token_duration(Duration::hours(-2));
        let token = auth.issue_access_token(1, Role::Player).unwrap();
        assert!(auth.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_require_role() {
        let player = Caller {
            id: 1,
            role: Role::Player,
        };
        assert!(AuthManager::require_role(&player, Role::Player).is_ok());
        assert!(matches!(
            AuthManager::require_role(&player, Role::Platform),
            Err(AuthError::Forbidden(Role::Platform))
        ));
    }
}
