//! Authentication data models.

use serde::{Deserialize, Serialize};

use crate::tournament::models::PlayerId;

/// Role carried in an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular participant (players and tournament creators)
    Player,
    /// Platform operator; reports standings and collects platform fees
    Platform,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Platform => write!(f, "platform"),
        }
    }
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: PlayerId, // Participant ID
    pub role: Role,
    pub exp: i64, // Expiration timestamp
    pub iat: i64, // Issued at timestamp
}

/// Authenticated caller extracted from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: PlayerId,
    pub role: Role,
}

impl Caller {
    pub fn is_platform(&self) -> bool {
        self.role == Role::Platform
    }
}

impl From<AccessTokenClaims> for Caller {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}
