//! Port for one-way password hashing.
//!
//! Adapters must compare hashes in constant time; the service never compares
//! hash bytes itself.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// Hash generation failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The password does not match the stored hash.
        Mismatch => "password does not match",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Salted, adaptive password hashing capability.
///
/// Callers treat every [`CredentialHasher::verify`] error as "does not match";
/// the variants exist for adapter diagnostics only.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh salt and the adapter's default cost.
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError>;

    /// Check `password` against a previously produced hash.
    fn verify(&self, hash: &PasswordHash, password: &str) -> Result<(), CredentialHasherError>;
}
