use std::collections::BTreeMap;
use std::time::Duration;

use crate::endpoint::DEFAULT_BASE_URL;

pub const DEFAULT_HISTORY_PATH: &str = "/api/chat/history";
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Transport configuration for chat backend requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatApiConfig {
    /// Base URL both endpoint paths are joined onto.
    pub base_url: String,
    /// Path of the history endpoint.
    pub history_path: String,
    /// Path of the send endpoint.
    pub chat_path: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional request timeout. Unset means a slow backend simply prolongs
    /// the loading state.
    pub timeout: Option<Duration>,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            history_path: DEFAULT_HISTORY_PATH.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl ChatApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_history_path(mut self, path: impl Into<String>) -> Self {
        self.history_path = path.into();
        self
    }

    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}
