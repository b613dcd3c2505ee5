use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a history fetch, a send, or an address lookup.
///
/// `Display` output is the human-readable message surfaced to callers.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("{message}")]
    Rejected { status: i64, message: String },

    #[error("response envelope has no data payload")]
    MissingData,

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl TransportError {
    /// Builds the error for an envelope whose embedded status is not the
    /// success sentinel, preferring the server-provided message.
    #[must_use]
    pub fn rejected(status: i64, message: &str, fallback: &str) -> Self {
        let message = message.trim();
        Self::Rejected {
            status,
            message: if message.is_empty() {
                fallback.to_string()
            } else {
                message.to_string()
            },
        }
    }

    #[must_use]
    pub fn invalid_base_url(value: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidBaseUrl {
            value: value.into(),
            source,
        }
    }

    /// HTTP status code attached to this failure, if any.
    #[must_use]
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}
