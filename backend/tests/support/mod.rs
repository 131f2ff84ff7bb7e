//! Shared helper utilities for integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! small fixtures live here instead of being copied between files.

use std::sync::Arc;
use std::time::Duration;

use sso::domain::{App, AppId, AppSecret, AuthService, Credentials};
use sso::outbound::crypto::{Argon2Hasher, JwtTokenIssuer};

/// Lifetime used for tokens issued in tests.
pub const TEST_TOKEN_TTL: Duration = Duration::from_secs(900);

/// App provisioned in every test store.
pub fn portal_app() -> App {
    App::new(AppId::new(1), "portal", AppSecret::new("portal-signing-secret"))
}

/// Argon2 hasher with minimal costs so tests stay fast.
pub fn cheap_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(1024, 1, 1).expect("cheap argon2 params are valid")
}

/// Validated credentials.
pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials::try_from_parts(email, password).expect("valid credentials")
}

/// Wire the real hasher and issuer around a store serving both users and apps.
pub fn service_over<S>(store: Arc<S>) -> AuthService<S, S, Argon2Hasher, JwtTokenIssuer> {
    AuthService::new(
        Arc::clone(&store),
        store,
        Arc::new(cheap_hasher()),
        Arc::new(JwtTokenIssuer::new()),
        TEST_TOKEN_TTL,
    )
}
