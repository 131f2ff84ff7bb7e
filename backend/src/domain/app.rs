//! Registered client applications.
//!
//! Apps are provisioned outside this crate and only ever looked up. The
//! secret scopes issued tokens: a token signed for one app does not verify
//! under another app's secret.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Externally assigned application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(i32);

impl AppId {
    /// Wrap a raw application identifier.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Access the raw identifier.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signing secret used to scope tokens to an app.
#[derive(Clone, PartialEq, Eq)]
pub struct AppSecret(Zeroizing<String>);

impl AppSecret {
    /// Wrap a secret loaded from the app store.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Expose the secret for signing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppSecret(<redacted>)")
    }
}

/// Application metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    id: AppId,
    name: String,
    secret: AppSecret,
}

impl App {
    /// Assemble an app from stored parts.
    pub fn new(id: AppId, name: impl Into<String>, secret: AppSecret) -> Self {
        Self {
            id,
            name: name.into(),
            secret,
        }
    }

    /// Application identifier.
    pub fn id(&self) -> AppId {
        self.id
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Token signing secret.
    pub fn secret(&self) -> &AppSecret {
        &self.secret
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn app_debug_redacts_secret() {
        let app = App::new(AppId::new(1), "console", AppSecret::new("s3cr3t"));
        let rendered = format!("{app:?}");
        assert!(rendered.contains("console"));
        assert!(!rendered.contains("s3cr3t"));
        assert_eq!(app.secret().expose(), "s3cr3t");
    }

    #[rstest]
    fn app_id_round_trips_through_json() {
        let id: AppId = serde_json::from_str("999").expect("app id");
        assert_eq!(id, AppId::new(999));
        assert_eq!(id.to_string(), "999");
    }
}
