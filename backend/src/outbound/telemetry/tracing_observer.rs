//! `tracing` adapter for the auth observer port.

use tracing::{debug, info, warn};

use crate::domain::ports::{AuthEvent, AuthObserver, AuthStage, AuthSubject};

/// Emits one structured `tracing` event per [`AuthEvent`].
///
/// Entry is logged at debug, rejections and successes at info, failures at
/// warn. Fields: `op`, `email` or `user_id`, `app_id`, `reason`, `code`,
/// `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuthObserver;

impl AuthObserver for TracingAuthObserver {
    fn record(&self, event: &AuthEvent) {
        let op = event.operation.as_str();
        let (email, user_id) = match &event.subject {
            AuthSubject::Email(email) => (Some(email.as_ref()), None),
            AuthSubject::User(id) => (None, Some(id.get())),
        };
        let app_id = event.app_id.map(|id| id.get());

        match &event.stage {
            AuthStage::Started => debug!(op, email, user_id, app_id, "auth operation started"),
            AuthStage::Rejected(reason) => info!(
                op,
                email,
                user_id,
                app_id,
                reason = reason.as_str(),
                "auth operation rejected"
            ),
            AuthStage::Failed { code, message } => warn!(
                op,
                email,
                user_id,
                app_id,
                code = ?code,
                error = %message,
                "auth operation failed"
            ),
            AuthStage::Succeeded => info!(op, email, user_id, app_id, "auth operation succeeded"),
        }
    }
}
