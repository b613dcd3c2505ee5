use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Embedded `status` value that marks a successful response envelope.
pub const SUCCESS_STATUS: i64 = 200;

const EPOCH_RFC3339: &str = "1970-01-01T00:00:00Z";

/// Current UTC time formatted as an RFC 3339 / ISO-8601 timestamp.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| EPOCH_RFC3339.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Message shape shared by the history endpoint and the widget transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_loading: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Environment snapshot attached to every request as `clientInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    pub session_id: String,
    pub user_id: String,
    /// Network-derived address, or an `anon_` tag when the lookup failed.
    pub ip: String,
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    pub screen_resolution: String,
    pub timezone: String,
    pub visit_count: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest<'a> {
    pub session_id: &'a str,
    pub offset: usize,
    pub limit: usize,
    pub client_info: &'a ClientContext,
    pub user_id: &'a str,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub query: &'a str,
    pub client_info: &'a ClientContext,
    pub user_id: &'a str,
    pub timestamp: String,
    pub message_id: &'a str,
}

/// `{status, message, data}` wrapper used by both endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    /// Newest-first on the wire.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyData {
    pub reply: String,
}
