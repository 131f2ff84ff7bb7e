//! Behaviour shared by the port error enums.
use rstest::rstest;

use super::*;

#[rstest]
#[case(
    UserPersistenceError::connection("refused"),
    "user repository connection failed: refused"
)]
#[case(UserPersistenceError::query("syntax"), "user repository query failed: syntax")]
#[case(
    UserPersistenceError::duplicate_email(),
    "user with this email already exists"
)]
#[case(UserPersistenceError::not_found(), "user not found")]
fn user_persistence_errors_render(#[case] err: UserPersistenceError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[rstest]
#[case(
    AppPersistenceError::connection("timeout"),
    "app repository connection failed: timeout"
)]
#[case(AppPersistenceError::query("bad row"), "app repository query failed: bad row")]
#[case(AppPersistenceError::not_found(), "app not found")]
fn app_persistence_errors_render(#[case] err: AppPersistenceError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[rstest]
fn hasher_and_issuer_errors_render() {
    assert_eq!(
        CredentialHasherError::malformed_hash("no salt").to_string(),
        "stored password hash is malformed: no salt"
    );
    assert_eq!(
        CredentialHasherError::mismatch().to_string(),
        "password does not match"
    );
    assert_eq!(
        TokenIssuerError::invalid_ttl("overflow").to_string(),
        "invalid token lifetime: overflow"
    );
}
