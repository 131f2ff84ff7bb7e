//! HS256 JSON Web Token issuer.
//!
//! Tokens are signed with the requesting app's secret, so a token minted for
//! one app does not verify under another.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenIssuer, TokenIssuerError};
use crate::domain::{AccessToken, App, AppSecret, RequestContext, User};

/// Claims carried by issued access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub uid: i64,
    /// User email.
    pub email: String,
    /// App the token is scoped to.
    pub app_id: i32,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
}

impl AccessClaims {
    fn new(
        user: &User,
        app: &App,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenIssuerError> {
        if ttl.is_zero() {
            return Err(TokenIssuerError::invalid_ttl("lifetime must be positive"));
        }
        let lifetime = chrono::Duration::from_std(ttl)
            .map_err(|err| TokenIssuerError::invalid_ttl(err.to_string()))?;
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenIssuerError::invalid_ttl("expiry overflows the clock"))?;
        Ok(Self {
            uid: user.id().get(),
            email: user.email().to_string(),
            app_id: app.id().get(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        })
    }
}

/// [`TokenIssuer`] producing HS256 JWTs keyed by the app secret.
#[derive(Debug, Clone)]
pub struct JwtTokenIssuer {
    header: Header,
}

impl Default for JwtTokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtTokenIssuer {
    /// Issuer using HS256.
    pub fn new() -> Self {
        Self {
            header: Header::new(Algorithm::HS256),
        }
    }

    /// Sign claims for `user` and `app` issued at `issued_at`.
    pub fn sign_at(
        &self,
        user: &User,
        app: &App,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<AccessToken, TokenIssuerError> {
        let claims = AccessClaims::new(user, app, issued_at, ttl)?;
        let key = EncodingKey::from_secret(app.secret().expose().as_bytes());
        let token = encode(&self.header, &claims, &key)
            .map_err(|err| TokenIssuerError::signing(err.to_string()))?;
        AccessToken::new(token).map_err(|err| TokenIssuerError::signing(err.to_string()))
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn issue(
        &self,
        _ctx: &RequestContext,
        user: &User,
        app: &App,
        ttl: Duration,
    ) -> Result<AccessToken, TokenIssuerError> {
        self.sign_at(user, app, ttl, Utc::now())
    }
}

/// Verify `token` against `secret` and return its claims.
///
/// Expired tokens and tokens signed with another secret are rejected.
pub fn decode_access_token(
    token: &str,
    secret: &AppSecret,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.expose().as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    decode::<AccessClaims>(token, &key, &validation).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{AppId, Email, PasswordHash, UserId};

    #[fixture]
    fn user() -> User {
        User::new(
            UserId::new(1),
            Email::new("a@x.com").expect("valid email"),
            PasswordHash::from_bytes(b"irrelevant".to_vec()),
        )
    }

    fn app(id: i32, secret: &str) -> App {
        App::new(AppId::new(id), "portal", AppSecret::new(secret))
    }

    #[rstest]
    #[tokio::test]
    async fn issued_tokens_decode_to_expected_claims(user: User) {
        let portal = app(1, "portal-secret");
        let token = JwtTokenIssuer::new()
            .issue(
                &RequestContext::background(),
                &user,
                &portal,
                Duration::from_secs(3600),
            )
            .await
            .expect("token issued");

        let claims = decode_access_token(token.as_str(), portal.secret()).expect("token decodes");

        assert_eq!(claims.uid, 1);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.app_id, 1);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[rstest]
    fn tokens_do_not_verify_under_another_app_secret(user: User) {
        let token = JwtTokenIssuer::new()
            .sign_at(&user, &app(1, "first"), Duration::from_secs(60), Utc::now())
            .expect("token issued");

        let result = decode_access_token(token.as_str(), &AppSecret::new("second"));

        assert!(result.is_err());
    }

    #[rstest]
    fn expired_tokens_are_rejected(user: User) {
        let portal = app(1, "portal-secret");
        let long_ago = Utc::now() - chrono::Duration::days(1);
        let token = JwtTokenIssuer::new()
            .sign_at(&user, &portal, Duration::from_secs(60), long_ago)
            .expect("token issued");

        let result = decode_access_token(token.as_str(), portal.secret());

        assert!(result.is_err());
    }

    #[rstest]
    fn zero_ttl_is_invalid(user: User) {
        let result =
            JwtTokenIssuer::new().sign_at(&user, &app(1, "s"), Duration::ZERO, Utc::now());
        assert!(matches!(result, Err(TokenIssuerError::InvalidTtl { .. })));
    }

    #[rstest]
    fn oversized_ttl_is_invalid(user: User) {
        let result =
            JwtTokenIssuer::new().sign_at(&user, &app(1, "s"), Duration::MAX, Utc::now());
        assert!(matches!(result, Err(TokenIssuerError::InvalidTtl { .. })));
    }
}
