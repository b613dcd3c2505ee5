//! Client context assembly: identity, best-effort address and environment.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use widget_api::{now_rfc3339, AddressLookupClient, ClientContext, TransportError};
use widget_identity::IdentityStore;

/// Upper bound on the address lookup before the anonymous tag is used.
pub const ADDRESS_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

const UNKNOWN: &str = "unknown";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("environment probe failed: {0}")]
    Probe(String),
}

#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup_address(&self) -> Result<String, TransportError>;
}

#[async_trait]
impl AddressLookup for AddressLookupClient {
    async fn lookup_address(&self) -> Result<String, TransportError> {
        self.lookup().await
    }
}

/// Host description sent along with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    pub screen_resolution: String,
    pub timezone: String,
}

impl Environment {
    /// Best-effort description of the current process environment.
    pub fn detect() -> Self {
        Self {
            user_agent: format!("chat_widget/{}", env!("CARGO_PKG_VERSION")),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            language: detect_language(),
            screen_resolution: UNKNOWN.to_string(),
            timezone: std::env::var("TZ")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
        }
    }

    pub fn with_screen_resolution(mut self, width: u32, height: u32) -> Self {
        self.screen_resolution = format!("{width}x{height}");
        self
    }
}

/// Source of the [`Environment`] used for a mount.
pub trait EnvironmentProbe: Send + Sync {
    fn probe(&self) -> Result<Environment, ContextError>;
}

impl EnvironmentProbe for Environment {
    fn probe(&self) -> Result<Environment, ContextError> {
        Ok(self.clone())
    }
}

/// Builds the context record for one mount.
///
/// Never waits longer than `lookup_limit` (normally [`ADDRESS_LOOKUP_TIMEOUT`])
/// on the address lookup and never fails because of it.
pub async fn build_context(
    identity: &IdentityStore,
    lookup: &dyn AddressLookup,
    probe: &dyn EnvironmentProbe,
    lookup_limit: Duration,
) -> Result<ClientContext, ContextError> {
    let environment = probe.probe()?;
    let ip = resolve_address(lookup, lookup_limit).await;
    let session_id = identity.get_current_session_id();
    let user_id = identity.get_or_create_user_id();
    let visit_count = identity.get_visit_count();

    tracing::debug!(%session_id, %user_id, visit_count, "client context resolved");
    Ok(ClientContext {
        session_id,
        user_id,
        ip,
        user_agent: environment.user_agent,
        platform: environment.platform,
        language: environment.language,
        screen_resolution: environment.screen_resolution,
        timezone: environment.timezone,
        visit_count,
        timestamp: now_rfc3339(),
    })
}

pub async fn resolve_address(lookup: &dyn AddressLookup, limit: Duration) -> String {
    match tokio::time::timeout(limit, lookup.lookup_address()).await {
        Ok(Ok(address)) => address,
        Ok(Err(error)) => {
            tracing::debug!(%error, "address lookup failed; using anonymous tag");
            anonymous_tag()
        }
        Err(_) => {
            tracing::debug!(?limit, "address lookup timed out; using anonymous tag");
            anonymous_tag()
        }
    }
}

/// `anon_` followed by eight fresh random hex digits.
pub fn anonymous_tag() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("anon_{}", &suffix[..8])
}

fn detect_language() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| normalize_locale(&value))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "en-US".to_string())
}

/// `en_US.UTF-8` becomes `en-US`; `C` and `POSIX` carry no language.
fn normalize_locale(raw: &str) -> String {
    let base = raw.split(['.', '@']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return String::new();
    }
    base.replace('_', "-")
}
