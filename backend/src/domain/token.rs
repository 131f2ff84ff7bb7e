//! Issued access tokens.

use std::fmt;

/// Errors raised when wrapping issuer output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessTokenError {
    /// The issuer returned an empty token.
    #[error("access token must not be empty")]
    Empty,
}

/// Opaque, time-bounded credential bound to one user and one app.
///
/// The service never inspects the contents after issuance; it only hands the
/// value back to the caller. `Debug` is redacted so tokens do not end up in
/// logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap issuer output, rejecting empty strings.
    pub fn new(token: impl Into<String>) -> Result<Self, AccessTokenError> {
        let token = token.into();
        if token.is_empty() {
            return Err(AccessTokenError::Empty);
        }
        Ok(Self(token))
    }

    /// Borrow the encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn empty_tokens_are_rejected() {
        assert_eq!(AccessToken::new(""), Err(AccessTokenError::Empty));
    }

    #[test]
    fn debug_output_hides_token() {
        let token = AccessToken::new("eyJhbGciOi.payload.sig").expect("token");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
        assert_eq!(token.as_str(), "eyJhbGciOi.payload.sig");
    }
}
