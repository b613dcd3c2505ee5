//! Session and state controller for an embeddable chat widget.
//!
//! The crate is split along the widget's seams:
//! - [`controller::ConversationController`] owns the transcript, pagination
//!   cursor, loading flags and the initialization phase. It performs no IO and
//!   answers every intent with [`controller::Effect`]s.
//! - [`scroll::ScrollCoordinator`] decides when the viewport follows new
//!   content and how it is restored around prepended history.
//! - [`context`] assembles the client context attached to every request.
//! - [`runtime::WidgetRuntime`] executes effects against a
//!   [`transport::ChatTransport`], an address lookup and the identity store.
//!
//! Wire payloads and the HTTP client live in `widget_api`; durable and
//! tab-scoped identity lives in `widget_identity`.

pub mod config;
pub mod context;
pub mod controller;
pub mod logging;
pub mod message;
pub mod runtime;
pub mod scroll;
pub mod transport;

pub use config::{ChatTheme, EnvConfig, LookupConfig, WidgetConfig, WidgetPosition};
pub use context::{build_context, AddressLookup, ContextError, Environment, EnvironmentProbe};
pub use controller::{
    ConversationController, Effect, HistoryKind, Phase, Rejection, RequestId, RequestTag,
};
pub use message::{Message, PaginationCursor, Role};
pub use runtime::WidgetRuntime;
pub use scroll::{ScrollCommand, ScrollCoordinator, ScrollMetrics};
pub use transport::ChatTransport;

pub use widget_api::{ClientContext, HistoryPage, TransportError};
pub use widget_identity::{IdentityStore, SessionIdentity};
