//! Authentication service implementing the login, registration and admin
//! query driving ports.
//!
//! The service is stateless. Collaborators are shared through `Arc`, every
//! store and issuer call is raced against the caller's [`RequestContext`],
//! and every failure leaves as a domain [`AuthError`] tagged with its
//! [`Operation`]. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{
    AdminQuery, AppPersistenceError, AppRepository, AuthEvent, AuthObserver, AuthStage,
    AuthSubject, CredentialHasher, LoginService, NoOpAuthObserver, RegistrationService,
    RejectionReason, TokenIssuer, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccessToken, App, AppId, AuthError, Credentials, ErrorCode, Interrupted, Operation,
    RequestContext, User, UserId,
};

/// Token lifetime used when callers do not configure one.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Authentication service wired to its driven ports.
pub struct AuthService<U, A, H, T, O = NoOpAuthObserver> {
    users: Arc<U>,
    apps: Arc<A>,
    hasher: Arc<H>,
    issuer: Arc<T>,
    observer: Arc<O>,
    token_ttl: Duration,
}

impl<U, A, H, T, O> Clone for AuthService<U, A, H, T, O> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            apps: Arc::clone(&self.apps),
            hasher: Arc::clone(&self.hasher),
            issuer: Arc::clone(&self.issuer),
            observer: Arc::clone(&self.observer),
            token_ttl: self.token_ttl,
        }
    }
}

impl<U, A, H, T> AuthService<U, A, H, T> {
    /// Create a service that issues tokens valid for `token_ttl` and discards
    /// observer events.
    pub fn new(
        users: Arc<U>,
        apps: Arc<A>,
        hasher: Arc<H>,
        issuer: Arc<T>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            apps,
            hasher,
            issuer,
            observer: Arc::new(NoOpAuthObserver),
            token_ttl,
        }
    }
}

impl<U, A, H, T, O> AuthService<U, A, H, T, O> {
    /// Replace the observer receiving authentication events.
    pub fn with_observer<P>(self, observer: Arc<P>) -> AuthService<U, A, H, T, P> {
        AuthService {
            users: self.users,
            apps: self.apps,
            hasher: self.hasher,
            issuer: self.issuer,
            observer,
            token_ttl: self.token_ttl,
        }
    }
}

impl<U, A, H, T, O> AuthService<U, A, H, T, O>
where
    U: UserRepository,
    A: AppRepository,
    H: CredentialHasher,
    T: TokenIssuer,
    O: AuthObserver,
{
    fn map_interrupted(operation: Operation) -> impl Fn(Interrupted) -> AuthError {
        move |interrupted| AuthError::cancelled(operation, interrupted.to_string())
    }

    fn reject(&self, event: &AuthEvent, reason: RejectionReason, error: AuthError) -> AuthError {
        self.observer
            .record(&event.with_stage(AuthStage::Rejected(reason)));
        error
    }

    /// Emit the terminal event for `result`.
    ///
    /// Rejections are recorded where they happen; only success and
    /// collaborator failures are recorded here.
    fn finish<V>(&self, event: &AuthEvent, result: Result<V, AuthError>) -> Result<V, AuthError> {
        match &result {
            Ok(_) => self.observer.record(&event.with_stage(AuthStage::Succeeded)),
            Err(err) if matches!(err.code(), ErrorCode::Unexpected | ErrorCode::Cancelled) => {
                self.observer.record(&event.failed(err));
            }
            Err(_) => {}
        }
        result
    }

    async fn find_user(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        event: &AuthEvent,
    ) -> Result<User, AuthError> {
        let op = Operation::Login;
        ctx.guard(self.users.user_by_email(ctx, credentials.email()))
            .await
            .map_err(Self::map_interrupted(op))?
            .map_err(|err| match err {
                UserPersistenceError::NotFound => self.reject(
                    event,
                    RejectionReason::UnknownEmail,
                    AuthError::invalid_credentials(op),
                ),
                other => AuthError::unexpected(op, format!("user lookup failed: {other}")),
            })
    }

    async fn find_app(
        &self,
        ctx: &RequestContext,
        app_id: AppId,
        event: &AuthEvent,
    ) -> Result<App, AuthError> {
        let op = Operation::Login;
        ctx.guard(self.apps.app_by_id(ctx, app_id))
            .await
            .map_err(Self::map_interrupted(op))?
            .map_err(|err| match err {
                AppPersistenceError::NotFound => {
                    self.reject(event, RejectionReason::UnknownApp, AuthError::app_not_found(op))
                }
                other => AuthError::unexpected(op, format!("app lookup failed: {other}")),
            })
    }

    async fn run_login(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        app_id: AppId,
        event: &AuthEvent,
    ) -> Result<AccessToken, AuthError> {
        let op = Operation::Login;
        let user = self.find_user(ctx, credentials, event).await?;

        // Every verification failure is reported as a mismatch.
        if self
            .hasher
            .verify(user.password_hash(), credentials.password())
            .is_err()
        {
            return Err(self.reject(
                event,
                RejectionReason::PasswordMismatch,
                AuthError::invalid_credentials(op),
            ));
        }

        let app = self.find_app(ctx, app_id, event).await?;

        ctx.guard(self.issuer.issue(ctx, &user, &app, self.token_ttl))
            .await
            .map_err(Self::map_interrupted(op))?
            .map_err(|err| AuthError::unexpected(op, format!("token issue failed: {err}")))
    }

    async fn run_register(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        event: &AuthEvent,
    ) -> Result<UserId, AuthError> {
        let op = Operation::Register;
        ctx.check().map_err(Self::map_interrupted(op))?;

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .map_err(|err| AuthError::unexpected(op, format!("password hashing failed: {err}")))?;

        ctx.guard(self.users.save_user(ctx, credentials.email(), &password_hash))
            .await
            .map_err(Self::map_interrupted(op))?
            .map_err(|err| match err {
                UserPersistenceError::DuplicateEmail => self.reject(
                    event,
                    RejectionReason::DuplicateEmail,
                    AuthError::user_already_exists(op),
                ),
                other => AuthError::unexpected(op, format!("user save failed: {other}")),
            })
    }

    async fn run_is_admin(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        event: &AuthEvent,
    ) -> Result<bool, AuthError> {
        let op = Operation::IsAdmin;
        ctx.guard(self.users.is_admin(ctx, user_id))
            .await
            .map_err(Self::map_interrupted(op))?
            .map_err(|err| match err {
                UserPersistenceError::NotFound => self.reject(
                    event,
                    RejectionReason::UnknownUser,
                    AuthError::user_not_found(op),
                ),
                other => AuthError::unexpected(op, format!("admin lookup failed: {other}")),
            })
    }
}

#[async_trait]
impl<U, A, H, T, O> LoginService for AuthService<U, A, H, T, O>
where
    U: UserRepository,
    A: AppRepository,
    H: CredentialHasher,
    T: TokenIssuer,
    O: AuthObserver,
{
    async fn login(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        app_id: AppId,
    ) -> Result<AccessToken, AuthError> {
        let event = AuthEvent::started(
            Operation::Login,
            AuthSubject::Email(credentials.email().clone()),
            Some(app_id),
        );
        self.observer.record(&event);
        let result = self.run_login(ctx, credentials, app_id, &event).await;
        self.finish(&event, result)
    }
}

#[async_trait]
impl<U, A, H, T, O> RegistrationService for AuthService<U, A, H, T, O>
where
    U: UserRepository,
    A: AppRepository,
    H: CredentialHasher,
    T: TokenIssuer,
    O: AuthObserver,
{
    async fn register(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
    ) -> Result<UserId, AuthError> {
        let event = AuthEvent::started(
            Operation::Register,
            AuthSubject::Email(credentials.email().clone()),
            None,
        );
        self.observer.record(&event);
        let result = self.run_register(ctx, credentials, &event).await;
        self.finish(&event, result)
    }
}

#[async_trait]
impl<U, A, H, T, O> AdminQuery for AuthService<U, A, H, T, O>
where
    U: UserRepository,
    A: AppRepository,
    H: CredentialHasher,
    T: TokenIssuer,
    O: AuthObserver,
{
    async fn is_admin(&self, ctx: &RequestContext, user_id: UserId) -> Result<bool, AuthError> {
        let event = AuthEvent::started(Operation::IsAdmin, AuthSubject::User(user_id), None);
        self.observer.record(&event);
        let result = self.run_is_admin(ctx, user_id, &event).await;
        self.finish(&event, result)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
