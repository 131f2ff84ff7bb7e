//! Port for observing authentication outcomes.
//!
//! Events carry identifiers and error codes only. Password material never
//! reaches an observer.

use crate::domain::{AppId, AuthError, Email, ErrorCode, Operation, UserId};

/// Who an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSubject {
    /// Login and registration are keyed by email.
    Email(Email),
    /// Admin lookups are keyed by user id.
    User(UserId),
}

/// Expected, caller-facing reasons an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// No account matches the supplied email.
    UnknownEmail,
    /// The password did not verify against the stored hash.
    PasswordMismatch,
    /// The app identifier is not registered.
    UnknownApp,
    /// Registration collided with an existing account.
    DuplicateEmail,
    /// Admin lookup for an identifier with no account.
    UnknownUser,
}

impl RejectionReason {
    /// Stable label for structured logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownEmail => "unknown_email",
            Self::PasswordMismatch => "password_mismatch",
            Self::UnknownApp => "unknown_app",
            Self::DuplicateEmail => "duplicate_email",
            Self::UnknownUser => "unknown_user",
        }
    }
}

/// Stage an operation reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStage {
    /// The operation was entered.
    Started,
    /// The operation was refused for an expected reason.
    Rejected(RejectionReason),
    /// A collaborator failed or the request was interrupted.
    Failed {
        /// Error code returned to the caller.
        code: ErrorCode,
        /// Diagnostic message returned to the caller.
        message: String,
    },
    /// The operation completed.
    Succeeded,
}

/// Structured event emitted by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    /// Operation that emitted the event.
    pub operation: Operation,
    /// Account the event concerns.
    pub subject: AuthSubject,
    /// App requested by a login, when known.
    pub app_id: Option<AppId>,
    /// Stage reached.
    pub stage: AuthStage,
}

impl AuthEvent {
    /// Event for an operation that has just started.
    pub fn started(operation: Operation, subject: AuthSubject, app_id: Option<AppId>) -> Self {
        Self {
            operation,
            subject,
            app_id,
            stage: AuthStage::Started,
        }
    }

    /// Copy of this event moved to another stage.
    #[must_use]
    pub fn with_stage(&self, stage: AuthStage) -> Self {
        Self {
            stage,
            ..self.clone()
        }
    }

    /// Copy of this event marking a failure with `error`.
    #[must_use]
    pub fn failed(&self, error: &AuthError) -> Self {
        self.with_stage(AuthStage::Failed {
            code: error.code(),
            message: error.message().to_owned(),
        })
    }
}

/// Receives [`AuthEvent`]s. Recording must not fail or block.
pub trait AuthObserver: Send + Sync {
    /// Record a single event.
    fn record(&self, event: &AuthEvent);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuthObserver;

impl AuthObserver for NoOpAuthObserver {
    fn record(&self, _event: &AuthEvent) {}
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    fn email() -> Email {
        Email::new("a@x.com").expect("valid email")
    }

    #[rstest]
    #[case(RejectionReason::UnknownEmail, "unknown_email")]
    #[case(RejectionReason::PasswordMismatch, "password_mismatch")]
    #[case(RejectionReason::UnknownApp, "unknown_app")]
    #[case(RejectionReason::DuplicateEmail, "duplicate_email")]
    #[case(RejectionReason::UnknownUser, "unknown_user")]
    fn rejection_labels_are_stable(#[case] reason: RejectionReason, #[case] label: &str) {
        assert_eq!(reason.as_str(), label);
    }

    #[rstest]
    fn failed_copies_code_and_message() {
        let started = AuthEvent::started(
            Operation::Login,
            AuthSubject::Email(email()),
            Some(AppId::new(1)),
        );
        let err = AuthError::unexpected(Operation::Login, "issuer offline");

        let failed = started.failed(&err);

        assert_eq!(failed.subject, started.subject);
        assert_eq!(failed.app_id, Some(AppId::new(1)));
        assert_eq!(
            failed.stage,
            AuthStage::Failed {
                code: ErrorCode::Unexpected,
                message: "issuer offline".to_owned(),
            }
        );
    }

    #[rstest]
    fn no_op_observer_accepts_events() {
        let event = AuthEvent::started(Operation::IsAdmin, AuthSubject::User(UserId::new(7)), None);
        NoOpAuthObserver.record(&event);
    }
}
