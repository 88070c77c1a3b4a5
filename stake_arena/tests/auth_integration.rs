//! Integration tests for access tokens.

use stake_arena::auth::{AuthManager, Role};

const SECRET: &str = "integration_secret_long_enough_for_hs256_signing";

#[test]
fn test_token_round_trip_per_role() {
    let auth = AuthManager::new(SECRET.to_string()).unwrap();

    for (id, role) in [(1, Role::Player), (2, Role::Platform)] {
        let token = auth.issue_access_token(id, role).unwrap();
        let caller = auth.verify_access_token(&token).unwrap();
        assert_eq!(caller.id, id);
        assert_eq!(caller.role, role);
    }
}

#[test]
fn test_tampered_token_rejected() {
    let auth = AuthManager::new(SECRET.to_string()).unwrap();
    let token = auth.issue_access_token(1, Role::Player).unwrap();

    let mut parts: Vec<&str> = token.split('.').collect();
    // Swap in a payload claiming platform role
    let forged = auth.issue_access_token(1, Role::Platform).unwrap();
    let forged_payload = forged.split('.').nth(1).unwrap();
    parts[1] = forged_payload;
    let tampered = parts.join(".");

    assert!(auth.verify_access_token(&tampered).is_err());
    assert!(auth.verify_access_token("not.a.token").is_err());
}
