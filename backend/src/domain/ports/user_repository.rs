//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, PasswordHash, RequestContext, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A user with the same email is already stored.
        DuplicateEmail => "user with this email already exists",
        /// No user matches the lookup key.
        NotFound => "user not found",
    }
}

/// Port for storing accounts and answering admin lookups.
///
/// Every method receives the caller's [`RequestContext`] unchanged so adapters
/// can bail out early; the service additionally drops the returned future
/// when the context fires.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account and return the store-assigned identifier.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] when the email is
    /// already taken.
    async fn save_user(
        &self,
        ctx: &RequestContext,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<UserId, UserPersistenceError>;

    /// Fetch an account by email.
    ///
    /// Fails with [`UserPersistenceError::NotFound`] when no account matches.
    async fn user_by_email(
        &self,
        ctx: &RequestContext,
        email: &Email,
    ) -> Result<User, UserPersistenceError>;

    /// Report the externally managed admin flag for an account.
    ///
    /// Fails with [`UserPersistenceError::NotFound`] for unknown identifiers.
    async fn is_admin(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<bool, UserPersistenceError>;
}
