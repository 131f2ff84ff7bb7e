//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (stores, hasher, issuer, observer) expose closed error enums
//! so adapters map their failures into predictable variants. Driving ports
//! are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod app_repository;
mod auth_observer;
mod credential_hasher;
mod login_service;
mod token_issuer;
mod user_repository;

#[cfg(test)]
pub use app_repository::MockAppRepository;
pub use app_repository::{AppPersistenceError, AppRepository};
pub use auth_observer::{
    AuthEvent, AuthObserver, AuthStage, AuthSubject, NoOpAuthObserver, RejectionReason,
};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
pub use login_service::{AdminQuery, LoginService, RegistrationService};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenIssuer, TokenIssuerError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
mod tests;
