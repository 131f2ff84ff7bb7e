//! Persistence adapters for users and apps.
//!
//! Both stores share one record model ([`StoreSnapshot`]) and translate
//! lookups into the port error variants the service expects. They contain no
//! authentication logic.
//!
//! # Example
//!
//! ```no_run
//! use sso::outbound::persistence::JsonFileStore;
//!
//! let store = JsonFileStore::open("sso-state.json")?;
//! # Ok::<(), sso::outbound::persistence::JsonStoreError>(())
//! ```

mod auth_state;
mod in_memory_store;
mod json_file_store;

pub use auth_state::{AppRecord, SnapshotError, StoreSnapshot, UserRecord};
pub use in_memory_store::InMemoryStore;
pub use json_file_store::{JsonFileStore, JsonStoreError};
