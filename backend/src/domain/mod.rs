//! Domain primitives, ports and the authentication service.
//!
//! Purpose: define the strongly typed entities the service works with and the
//! service itself. Adapters live in [`crate::outbound`] and plug in through
//! [`ports`].
//!
//! Public surface:
//! - AuthError / ErrorCode / Operation: closed failure taxonomy.
//! - User, App, AccessToken, Credentials: validated domain values.
//! - RequestContext: cancellation and deadline scope.
//! - AuthService: implements the driving ports in [`ports`].

pub mod app;
pub mod auth;
pub mod auth_service;
pub mod context;
pub mod error;
pub mod ports;
pub mod token;
pub mod user;

pub use self::app::{App, AppId, AppSecret};
pub use self::auth::{Credentials, CredentialsValidationError};
pub use self::auth_service::{AuthService, DEFAULT_TOKEN_TTL};
pub use self::context::{Interrupted, RequestContext};
pub use self::error::{AuthError, ErrorCode, INVALID_CREDENTIALS_MESSAGE, Operation};
pub use self::token::{AccessToken, AccessTokenError};
pub use self::user::{Email, PasswordHash, User, UserId, UserValidationError};

/// Result alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
