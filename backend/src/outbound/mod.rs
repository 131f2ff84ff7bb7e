//! Outbound adapters implementing domain ports.
//!
//! - **crypto**: Argon2 password hashing and HS256 token signing
//! - **persistence**: in-memory and JSON-file user/app stores
//! - **telemetry**: `tracing` observer and subscriber initialisation
//!
//! Adapters are thin translators between domain types and their
//! infrastructure. They contain no authentication logic.

pub mod crypto;
pub mod persistence;
pub mod telemetry;
