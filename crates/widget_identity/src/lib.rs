//! Durable and tab-scoped identity for the chat widget.
//!
//! The store never surfaces storage failures to its callers: when a backend
//! cannot be read or written, values degrade to an in-process fallback.

mod backend;
mod error;
mod paths;
mod store;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::IdentityStoreError;
pub use paths::{durable_store_path, IDENTITY_DIR, IDENTITY_FILE};
pub use store::{
    IdentityStore, SessionIdentity, SESSION_ID_KEY, USER_ID_KEY, VISIT_COUNT_KEY,
};
