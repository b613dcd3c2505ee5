use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ChatApiConfig;
use crate::endpoint::endpoint_url;
use crate::error::TransportError;
use crate::payload::{
    now_rfc3339, ChatMessage, ChatRequest, ClientContext, Envelope, HistoryData, HistoryRequest,
    ReplyData, SUCCESS_STATUS,
};

const FETCH_FALLBACK_MESSAGE: &str = "Failed to fetch messages";
const SEND_FALLBACK_MESSAGE: &str = "Failed to send message";

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
    history_url: Url,
    chat_url: Url,
}

/// One page of history, already in chronological order (oldest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub messages: Vec<ChatMessage>,
    pub has_more: bool,
    pub total: u64,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, TransportError> {
        let history_url = endpoint_url(&config.base_url, &config.history_path)?;
        let chat_url = endpoint_url(&config.base_url, &config.chat_path)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            config,
            history_url,
            chat_url,
        })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn history_url(&self) -> &Url {
        &self.history_url
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn build_headers(&self) -> Result<HeaderMap, TransportError> {
        let mut out = HeaderMap::new();
        out.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(user_agent) = self
            .config
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            out.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent).map_err(|_| TransportError::InvalidHeader {
                    name: USER_AGENT.to_string(),
                })?,
            );
        }

        for (key, value) in &self.config.extra_headers {
            let invalid = || TransportError::InvalidHeader { name: key.clone() };
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| invalid())?,
                HeaderValue::from_str(value).map_err(|_| invalid())?,
            );
        }

        Ok(out)
    }

    pub fn build_history_request(
        &self,
        request: &HistoryRequest<'_>,
    ) -> Result<RequestBuilder, TransportError> {
        Ok(self
            .http
            .post(self.history_url.clone())
            .headers(self.build_headers()?)
            .json(request))
    }

    pub fn build_chat_request(
        &self,
        request: &ChatRequest<'_>,
    ) -> Result<RequestBuilder, TransportError> {
        Ok(self
            .http
            .post(self.chat_url.clone())
            .headers(self.build_headers()?)
            .json(request))
    }

    /// Fetches one page of history starting `offset` messages back from the
    /// newest one.
    pub async fn fetch_history(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
        client_info: &ClientContext,
        user_id: &str,
    ) -> Result<HistoryPage, TransportError> {
        let request = HistoryRequest {
            session_id,
            offset,
            limit,
            client_info,
            user_id,
            timestamp: now_rfc3339(),
        };
        tracing::debug!(session_id, offset, limit, "fetching history page");

        let builder = self.build_history_request(&request)?;
        let data: HistoryData = execute(builder, FETCH_FALLBACK_MESSAGE).await?;
        Ok(into_chronological_page(data))
    }

    /// Sends a user query and returns the assistant's reply text.
    pub async fn send_message(
        &self,
        session_id: &str,
        query: &str,
        client_info: &ClientContext,
        user_id: &str,
        message_id: &str,
    ) -> Result<String, TransportError> {
        let request = ChatRequest {
            session_id,
            query,
            client_info,
            user_id,
            timestamp: now_rfc3339(),
            message_id,
        };
        tracing::debug!(session_id, message_id, "sending chat message");

        let builder = self.build_chat_request(&request)?;
        let data: ReplyData = execute(builder, SEND_FALLBACK_MESSAGE).await?;
        Ok(data.reply)
    }
}

async fn execute<T>(builder: RequestBuilder, fallback: &str) -> Result<T, TransportError>
where
    T: DeserializeOwned,
{
    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status));
    }

    let body = response.text().await?;
    parse_envelope(&body, fallback)
}

/// Decodes a `{status, message, data}` body and enforces the success sentinel.
pub fn parse_envelope<T>(body: &str, fallback: &str) -> Result<T, TransportError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(TransportError::Decode)?;
    if envelope.status != SUCCESS_STATUS {
        return Err(TransportError::rejected(
            envelope.status,
            &envelope.message,
            fallback,
        ));
    }

    envelope.data.ok_or(TransportError::MissingData)
}

fn into_chronological_page(data: HistoryData) -> HistoryPage {
    let mut messages = data.messages;
    messages.reverse();
    HistoryPage {
        messages,
        has_more: data.has_more,
        total: data.total,
    }
}
