//! Tracing bootstrap for hosts that do not install their own subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Resolves the filter: `RUST_LOG` first, then `directive`, then `info`.
pub fn env_filter(directive: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive.unwrap_or(DEFAULT_DIRECTIVE)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs a stderr fmt subscriber.
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one is left in place.
pub fn init_logging(directive: Option<&str>) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
