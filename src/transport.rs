//! Seam between the runtime and the chat backend.

use async_trait::async_trait;
use widget_api::{ChatApiClient, ClientContext, HistoryPage, TransportError};

/// The two backend operations the widget needs.
///
/// Implementations must return history pages in chronological order.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn fetch_history(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
        client_info: &ClientContext,
        user_id: &str,
    ) -> Result<HistoryPage, TransportError>;

    async fn send_message(
        &self,
        session_id: &str,
        query: &str,
        client_info: &ClientContext,
        user_id: &str,
        message_id: &str,
    ) -> Result<String, TransportError>;
}

#[async_trait]
impl ChatTransport for ChatApiClient {
    async fn fetch_history(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
        client_info: &ClientContext,
        user_id: &str,
    ) -> Result<HistoryPage, TransportError> {
        ChatApiClient::fetch_history(self, session_id, offset, limit, client_info, user_id).await
    }

    async fn send_message(
        &self,
        session_id: &str,
        query: &str,
        client_info: &ClientContext,
        user_id: &str,
        message_id: &str,
    ) -> Result<String, TransportError> {
        ChatApiClient::send_message(self, session_id, query, client_info, user_id, message_id)
            .await
    }
}
