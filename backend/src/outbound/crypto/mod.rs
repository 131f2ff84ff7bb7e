//! Password hashing and token signing adapters.

mod argon2_hasher;
mod jwt_token_issuer;

pub use argon2_hasher::Argon2Hasher;
pub use jwt_token_issuer::{AccessClaims, JwtTokenIssuer, decode_access_token};
