//! Port for signing access tokens.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{AccessToken, App, RequestContext, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token issuers.
    pub enum TokenIssuerError {
        /// Encoding or signing the token failed.
        Signing { message: String } => "token signing failed: {message}",
        /// The requested lifetime cannot be represented.
        InvalidTtl { message: String } => "invalid token lifetime: {message}",
    }
}

/// Produces signed, time-bounded tokens for a `(user, app)` pair.
///
/// The encoded token must let a downstream verifier recover the user id,
/// email, app id and expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `user` scoped to `app`, valid for `ttl`.
    async fn issue(
        &self,
        ctx: &RequestContext,
        user: &User,
        app: &App,
        ttl: Duration,
    ) -> Result<AccessToken, TokenIssuerError>;
}
