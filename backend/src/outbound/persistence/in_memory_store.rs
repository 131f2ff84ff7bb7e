//! Process-local user and app store.
//!
//! Used by tests and by callers that provision apps programmatically. The
//! admin flag is only mutable through [`InMemoryStore::set_admin`], which
//! stands in for the external administrative process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{
    AppPersistenceError, AppRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{App, AppId, Email, PasswordHash, RequestContext, User, UserId};

use super::auth_state::AuthState;

/// In-memory implementation of [`UserRepository`] and [`AppRepository`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<AuthState>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-provisioned with `apps`.
    pub fn with_apps(apps: impl IntoIterator<Item = App>) -> Self {
        let mut state = AuthState::default();
        for app in apps {
            state.upsert_app(app);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Add or replace an app.
    pub async fn insert_app(&self, app: App) {
        self.state.write().await.upsert_app(app);
    }

    /// Set the admin flag for `user_id`, returning the previous value.
    pub async fn set_admin(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<bool, UserPersistenceError> {
        self.state.write().await.set_admin(user_id, is_admin)
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.user_count()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn save_user(
        &self,
        _ctx: &RequestContext,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<UserId, UserPersistenceError> {
        self.state.write().await.insert_user(email, password_hash)
    }

    async fn user_by_email(
        &self,
        _ctx: &RequestContext,
        email: &Email,
    ) -> Result<User, UserPersistenceError> {
        self.state.read().await.user_by_email(email)
    }

    async fn is_admin(
        &self,
        _ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<bool, UserPersistenceError> {
        self.state.read().await.is_admin(user_id)
    }
}

#[async_trait]
impl AppRepository for InMemoryStore {
    async fn app_by_id(
        &self,
        _ctx: &RequestContext,
        app_id: AppId,
    ) -> Result<App, AppPersistenceError> {
        self.state.read().await.app(app_id)
    }
}
