//! Authentication module providing signed access tokens.
//!
//! Tokens identify a participant and carry a [`Role`]. Tournament-level
//! authorization (creator, platform admin) is enforced by the tournament
//! engine against the authenticated id.
//!
//! ## Example
//!
//! ```
//! use stake_arena::auth::{AuthManager, Role};
//!
//! let auth = AuthManager::new("a_signing_secret_of_at_least_32_bytes".to_string()).unwrap();
//! let token = auth.issue_access_token(7, Role::Player).unwrap();
//!
//! let caller = auth.verify_access_token(&token).unwrap();
//! assert_eq!(caller.id, 7);
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{AccessTokenClaims, Caller, Role};
