//! Transcript entries and the history pagination cursor.

use widget_api::{now_rfc3339, ChatMessage};

pub use widget_api::MessageRole as Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// ISO-8601 creation time.
    pub created_at: String,
    /// True only for the optimistic placeholder awaiting a reply.
    pub is_loading: bool,
    /// Correlation id of an optimistic placeholder; `None` for settled messages.
    pub correlation_id: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::settled(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::settled(Role::Assistant, content.into())
    }

    pub fn placeholder(correlation_id: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            created_at: now_rfc3339(),
            is_loading: true,
            correlation_id: Some(correlation_id.into()),
        }
    }

    fn settled(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            created_at: now_rfc3339(),
            is_loading: false,
            correlation_id: None,
        }
    }

    pub fn is_placeholder_for(&self, correlation_id: &str) -> bool {
        self.is_loading && self.correlation_id.as_deref() == Some(correlation_id)
    }
}

impl From<ChatMessage> for Message {
    /// Server messages are always settled, whatever the wire flag says.
    fn from(message: ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
            created_at: message.created_at,
            is_loading: false,
            correlation_id: None,
        }
    }
}

/// Position in server history, counted in messages already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    pub offset: usize,
    pub has_more: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            offset: 0,
            has_more: true,
        }
    }
}
