//! Domain-level error types.
//!
//! These errors are transport agnostic. Every failure leaving the
//! authentication service is one of the [`ErrorCode`] kinds below, tagged with
//! the [`Operation`] that produced it. Inbound adapters decide how much of the
//! message to show; [`AuthError::public_message`] is the end-user safe rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown account, wrong password, or unverifiable hash.
    ///
    /// These three causes are deliberately indistinguishable.
    InvalidCredentials,
    /// Registration attempted with an email that is already taken.
    UserAlreadyExists,
    /// The requested application identifier is not registered.
    AppNotFound,
    /// Admin lookup for an identifier with no matching user.
    UserNotFound,
    /// The caller cancelled the request or its deadline elapsed.
    Cancelled,
    /// Any other collaborator failure.
    Unexpected,
}

/// Public operations of the authentication service.
///
/// The label is attached to every error and log event so failures can be
/// traced back to the entry point that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// `auth.login`
    #[serde(rename = "auth.login")]
    Login,
    /// `auth.register`
    #[serde(rename = "auth.register")]
    Register,
    /// `auth.is_admin`
    #[serde(rename = "auth.is_admin")]
    IsAdmin,
}

impl Operation {
    /// Stable dotted label used in errors and structured logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "auth.login",
            Self::Register => "auth.register",
            Self::IsAdmin => "auth.is_admin",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message shared by every credential rejection so the outcomes cannot be
/// told apart.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty.
/// - Every [`ErrorCode::InvalidCredentials`] error carries
///   [`INVALID_CREDENTIALS_MESSAGE`], whatever the underlying cause.
///
/// # Examples
/// ```
/// use sso::domain::{AuthError, ErrorCode, Operation};
///
/// let err = AuthError::app_not_found(Operation::Login);
/// assert_eq!(err.code(), ErrorCode::AppNotFound);
/// assert_eq!(err.to_string(), "auth.login: app not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    code: ErrorCode,
    operation: Operation,
    message: String,
}

impl AuthError {
    fn new(code: ErrorCode, operation: Operation, message: impl Into<String>) -> Self {
        let raw = message.into();
        let message = if raw.trim().is_empty() {
            "unspecified failure".to_owned()
        } else {
            raw
        };
        Self {
            code,
            operation,
            message,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Operation that produced the error.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Diagnostic message, possibly carrying collaborator detail.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Message safe to show to end users.
    ///
    /// Collaborator detail is withheld for [`ErrorCode::Unexpected`].
    pub fn public_message(&self) -> &str {
        match self.code {
            ErrorCode::Unexpected => "internal error",
            _ => self.message.as_str(),
        }
    }

    /// Convenience constructor for [`ErrorCode::InvalidCredentials`].
    pub fn invalid_credentials(operation: Operation) -> Self {
        Self::new(
            ErrorCode::InvalidCredentials,
            operation,
            INVALID_CREDENTIALS_MESSAGE,
        )
    }

    /// Convenience constructor for [`ErrorCode::UserAlreadyExists`].
    pub fn user_already_exists(operation: Operation) -> Self {
        Self::new(ErrorCode::UserAlreadyExists, operation, "user already exists")
    }

    /// Convenience constructor for [`ErrorCode::AppNotFound`].
    pub fn app_not_found(operation: Operation) -> Self {
        Self::new(ErrorCode::AppNotFound, operation, "app not found")
    }

    /// Convenience constructor for [`ErrorCode::UserNotFound`].
    pub fn user_not_found(operation: Operation) -> Self {
        Self::new(ErrorCode::UserNotFound, operation, "user not found")
    }

    /// Convenience constructor for [`ErrorCode::Cancelled`].
    pub fn cancelled(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cancelled, operation, message)
    }

    /// Convenience constructor for [`ErrorCode::Unexpected`].
    pub fn unexpected(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unexpected, operation, message)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

impl std::error::Error for AuthError {}
