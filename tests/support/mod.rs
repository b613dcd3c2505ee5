#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chat_widget::context::{AddressLookup, ContextError, Environment, EnvironmentProbe};
use chat_widget::controller::{ConversationController, Effect, HistoryKind, RequestTag};
use chat_widget::transport::ChatTransport;
use chat_widget::WidgetConfig;
use widget_api::{ChatMessage, ClientContext, HistoryPage, MessageRole, TransportError};

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// `total` alternating messages, oldest first, with increasing timestamps.
pub fn server_history(total: usize) -> Vec<ChatMessage> {
    (0..total)
        .map(|index| ChatMessage {
            role: if index % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            },
            content: format!("message {index}"),
            created_at: format!("2024-01-01T00:{:02}:00Z", index),
            is_loading: false,
        })
        .collect()
}

/// What a backend holding `history` returns for `offset`/`limit`, after the
/// client has put the newest-first wire page back into chronological order.
pub fn history_page(history: &[ChatMessage], offset: usize, limit: usize) -> HistoryPage {
    let mut messages: Vec<ChatMessage> = history
        .iter()
        .rev()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    messages.reverse();
    HistoryPage {
        has_more: offset + messages.len() < history.len(),
        total: history.len() as u64,
        messages,
    }
}

pub fn client_context(session_id: &str) -> ClientContext {
    ClientContext {
        session_id: session_id.to_string(),
        user_id: "user-1".to_string(),
        ip: "203.0.113.9".to_string(),
        user_agent: "chat_widget-tests".to_string(),
        platform: "linux-x86_64".to_string(),
        language: "en-US".to_string(),
        screen_resolution: "1280x800".to_string(),
        timezone: "UTC".to_string(),
        visit_count: 1,
        timestamp: "2024-01-01T00:00:00Z".to_string(),
    }
}

pub fn ready_controller(config: WidgetConfig) -> ConversationController {
    let mut controller = ConversationController::new(config);
    let attempt = match controller.mount().as_slice() {
        [Effect::BuildContext { attempt }] => *attempt,
        other => panic!("expected a context request, got {other:?}"),
    };
    let effects = controller.on_context_ready(attempt, client_context("session-1"));
    assert!(effects.is_empty(), "closed widget should not fetch: {effects:?}");
    controller
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub tag: RequestTag,
    pub kind: HistoryKind,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCall {
    pub tag: RequestTag,
    pub query: String,
    pub message_id: String,
}

pub fn single_fetch(effects: Vec<Effect>) -> FetchCall {
    match effects.as_slice() {
        [Effect::FetchHistory {
            tag,
            kind,
            offset,
            limit,
        }] => FetchCall {
            tag: tag.clone(),
            kind: *kind,
            offset: *offset,
            limit: *limit,
        },
        other => panic!("expected one history fetch, got {other:?}"),
    }
}

pub fn single_send(effects: Vec<Effect>) -> SendCall {
    match effects.as_slice() {
        [Effect::SendMessage {
            tag,
            query,
            message_id,
        }] => SendCall {
            tag: tag.clone(),
            query: query.clone(),
            message_id: message_id.clone(),
        },
        other => panic!("expected one send, got {other:?}"),
    }
}

pub fn backend_error(message: &str) -> TransportError {
    TransportError::rejected(500, message, "Failed to send message")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    History {
        session_id: String,
        offset: usize,
        limit: usize,
        user_id: String,
    },
    Send {
        session_id: String,
        query: String,
        message_id: String,
    },
}

#[derive(Debug, Default)]
struct FakeState {
    history: Vec<ChatMessage>,
    history_failures: usize,
    replies: VecDeque<Result<String, String>>,
    calls: Vec<TransportCall>,
}

/// In-memory backend; clones share state so tests can inspect calls.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn with_history(total: usize) -> Self {
        let transport = Self::default();
        lock_unpoisoned(&transport.state).history = server_history(total);
        transport
    }

    pub fn fail_history(&self, times: usize) {
        lock_unpoisoned(&self.state).history_failures = times;
    }

    pub fn push_reply(&self, reply: &str) {
        lock_unpoisoned(&self.state)
            .replies
            .push_back(Ok(reply.to_string()));
    }

    pub fn push_send_failure(&self, message: &str) {
        lock_unpoisoned(&self.state)
            .replies
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        lock_unpoisoned(&self.state).calls.clone()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn fetch_history(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
        _client_info: &ClientContext,
        user_id: &str,
    ) -> Result<HistoryPage, TransportError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(TransportCall::History {
            session_id: session_id.to_string(),
            offset,
            limit,
            user_id: user_id.to_string(),
        });
        if state.history_failures > 0 {
            state.history_failures -= 1;
            return Err(TransportError::rejected(500, "", "Failed to fetch messages"));
        }
        Ok(history_page(&state.history, offset, limit))
    }

    async fn send_message(
        &self,
        session_id: &str,
        query: &str,
        _client_info: &ClientContext,
        _user_id: &str,
        message_id: &str,
    ) -> Result<String, TransportError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(TransportCall::Send {
            session_id: session_id.to_string(),
            query: query.to_string(),
            message_id: message_id.to_string(),
        });
        match state.replies.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(backend_error(&message)),
            None => Ok(format!("echo: {query}")),
        }
    }
}

/// Address lookup that answers immediately, fails, or never answers.
#[derive(Debug, Clone)]
pub enum FakeLookup {
    Address(String),
    Failing,
    Hanging,
}

#[async_trait]
impl AddressLookup for FakeLookup {
    async fn lookup_address(&self) -> Result<String, TransportError> {
        match self {
            Self::Address(address) => Ok(address.clone()),
            Self::Failing => Err(TransportError::MissingData),
            Self::Hanging => {
                std::future::pending::<()>().await;
                Err(TransportError::MissingData)
            }
        }
    }
}

pub fn test_environment() -> Environment {
    Environment {
        user_agent: "chat_widget-tests".to_string(),
        platform: "linux-x86_64".to_string(),
        language: "en-US".to_string(),
        screen_resolution: "unknown".to_string(),
        timezone: "UTC".to_string(),
    }
    .with_screen_resolution(1280, 800)
}

/// Probe that always fails, for initialization failure paths.
#[derive(Debug, Clone, Copy)]
pub struct BrokenProbe;

impl EnvironmentProbe for BrokenProbe {
    fn probe(&self) -> Result<Environment, ContextError> {
        Err(ContextError::Probe("display unavailable".to_string()))
    }
}
