use url::Url;

use crate::error::TransportError;

/// Default base URL used when the embedding configuration leaves it blank.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Joins a base URL with an endpoint path.
///
/// Normalization rules:
/// 1) a blank base falls back to [`DEFAULT_BASE_URL`]
/// 2) trailing slashes on the base are dropped
/// 3) the path always contributes exactly one leading slash
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, TransportError> {
    let base = if base.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        base.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    let joined = format!("{trimmed}/{path}");
    Url::parse(&joined).map_err(|source| TransportError::invalid_base_url(joined, source))
}
