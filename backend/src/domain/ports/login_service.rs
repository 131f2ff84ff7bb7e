//! Driving ports for the authentication use-cases.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters (the CLI,
//! tests, a future HTTP layer) call them without knowing which stores,
//! hasher or issuer sit behind the service.

use async_trait::async_trait;

use crate::domain::{AccessToken, AppId, AuthResult, Credentials, RequestContext, UserId};

/// Exchange credentials for an app-scoped access token.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate `credentials` and issue a token for `app_id`.
    ///
    /// Unknown emails and wrong passwords both fail with
    /// [`ErrorCode::InvalidCredentials`](crate::domain::ErrorCode::InvalidCredentials).
    async fn login(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        app_id: AppId,
    ) -> AuthResult<AccessToken>;
}

/// Create new accounts.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Register `credentials` and return the new account id.
    async fn register(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
    ) -> AuthResult<UserId>;
}

/// Answer admin-flag queries.
#[async_trait]
pub trait AdminQuery: Send + Sync {
    /// Report whether `user_id` holds the admin flag.
    async fn is_admin(&self, ctx: &RequestContext, user_id: UserId) -> AuthResult<bool>;
}
