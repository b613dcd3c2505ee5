//! Transport-only client primitives for the chat widget backend.
//!
//! This crate owns request building, response parsing and error normalization
//! for the two chat endpoints (`history` and `chat`) plus the best-effort
//! network address lookup. It holds no conversation state: callers decide
//! what a failure means.
//!
//! History pages arrive newest-first on the wire. [`ChatApiClient::fetch_history`]
//! reverses every page so callers always observe chronological order.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod lookup;
pub mod payload;

pub use client::{ChatApiClient, HistoryPage};
pub use config::ChatApiConfig;
pub use endpoint::endpoint_url;
pub use error::TransportError;
pub use lookup::{AddressLookupClient, DEFAULT_LOOKUP_URL};
pub use payload::{now_rfc3339, ChatMessage, ClientContext, MessageRole, SUCCESS_STATUS};
