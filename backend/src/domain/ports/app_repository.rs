//! Port abstraction for application lookups.
use async_trait::async_trait;

use crate::domain::{App, AppId, RequestContext};

use super::define_port_error;

define_port_error! {
    /// Errors raised by app repository adapters.
    pub enum AppPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "app repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "app repository query failed: {message}",
        /// No app is registered under the identifier.
        NotFound => "app not found",
    }
}

/// Read-only port resolving app identifiers to app metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Fetch an app by identifier.
    ///
    /// Fails with [`AppPersistenceError::NotFound`] for unknown identifiers.
    async fn app_by_id(
        &self,
        ctx: &RequestContext,
        app_id: AppId,
    ) -> Result<App, AppPersistenceError>;
}
