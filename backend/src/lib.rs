//! Single sign-on authentication core.
//!
//! [`domain`] holds the validated types, ports and the
//! [`AuthService`](domain::AuthService) implementing login, registration and
//! admin queries. [`outbound`] provides the Argon2 hasher, JWT issuer, stores
//! and logging adapters. [`config`] loads runtime settings.

pub mod config;
pub mod domain;
pub mod outbound;
