//! Conversation state machine.
//!
//! [`ConversationController`] owns every piece of conversation state and never
//! performs IO. Intents return the [`Effect`]s a driver must carry out; the
//! driver feeds results back through the `on_*` methods. Every network effect
//! carries a [`RequestTag`] so results for a superseded session or request are
//! dropped instead of applied.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;
use widget_api::{ChatMessage, ClientContext, HistoryPage};

use crate::config::WidgetConfig;
use crate::message::{Message, PaginationCursor};
use crate::scroll::{ScrollCommand, ScrollCoordinator, ScrollMetrics};

pub const INITIAL_PAGE_SIZE: usize = 4;
pub const OLDER_PAGE_SIZE: usize = 10;

pub const SEND_APOLOGY: &str = "⚠️ Sorry, I encountered an error. Please try again.";
pub const RESET_MESSAGE: &str = "🔄 Starting fresh conversation! How can I assist you today?";
pub const INIT_ERROR_BANNER: &str = "Failed to initialize chat session";

pub type RequestId = u64;

/// Identifies one outstanding request and the session it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub request_id: RequestId,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Initial,
    Older,
}

impl HistoryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Older => "older",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Resolve the client context; answer with `on_context_ready`/`on_context_failed`.
    BuildContext { attempt: RequestId },
    FetchHistory {
        tag: RequestTag,
        kind: HistoryKind,
        offset: usize,
        limit: usize,
    },
    SendMessage {
        tag: RequestTag,
        query: String,
        message_id: String,
    },
}

/// Why an intent was refused without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("chat session is not initialized")]
    Uninitialized,
    #[error("message is empty")]
    EmptyInput,
    #[error("a message is already being sent")]
    SendInFlight,
    #[error("history is already loading")]
    AlreadyLoading,
    #[error("no older messages to load")]
    NoMoreHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitialLoad {
    Pending,
    Loading(RequestId),
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSend {
    request_id: RequestId,
    message_id: String,
}

#[derive(Debug, Clone)]
pub struct ConversationController {
    config: WidgetConfig,
    phase: Phase,
    init_attempt: Option<RequestId>,
    context: Option<ClientContext>,
    session_id: String,
    messages: Vec<Message>,
    cursor: PaginationCursor,
    initial_load: InitialLoad,
    loading_older: Option<RequestId>,
    sending: Option<PendingSend>,
    input: String,
    error: Option<String>,
    is_open: bool,
    scroll: ScrollCoordinator,
    next_request_id: RequestId,
}

impl ConversationController {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            phase: Phase::Uninitialized,
            init_attempt: None,
            context: None,
            session_id: String::new(),
            messages: Vec::new(),
            cursor: PaginationCursor::default(),
            initial_load: InitialLoad::Pending,
            loading_older: None,
            sending: None,
            input: String::new(),
            error: None,
            is_open: false,
            scroll: ScrollCoordinator::new(),
            next_request_id: 1,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Persistent banner text; only initialization failures set it.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn context(&self) -> Option<&ClientContext> {
        self.context.as_ref()
    }

    /// Session id requests are issued for; `None` until initialized.
    pub fn session_id(&self) -> Option<&str> {
        if self.session_id.is_empty() {
            None
        } else {
            Some(&self.session_id)
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.context.as_ref().map(|context| context.user_id.as_str())
    }

    pub fn visit_count(&self) -> Option<u64> {
        self.context.as_ref().map(|context| context.visit_count)
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_some()
    }

    pub fn is_loading_older(&self) -> bool {
        self.loading_older.is_some()
    }

    pub fn is_loading_initial(&self) -> bool {
        matches!(self.initial_load, InitialLoad::Loading(_))
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_send(&self) -> bool {
        self.is_ready() && self.sending.is_none() && !self.input.trim().is_empty()
    }

    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    pub fn show_jump_to_bottom(&self) -> bool {
        self.scroll.show_jump_to_bottom(self.messages.len())
    }

    pub fn mount(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Uninitialized {
            return Vec::new();
        }
        self.begin_initialization()
    }

    /// Re-enters initialization after a failure; no-op otherwise.
    pub fn retry_initialization(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Failed {
            return Vec::new();
        }
        self.begin_initialization()
    }

    fn begin_initialization(&mut self) -> Vec<Effect> {
        let attempt = self.allocate_request_id();
        self.phase = Phase::Initializing;
        self.init_attempt = Some(attempt);
        self.error = None;
        tracing::debug!(attempt, "initializing chat session");
        vec![Effect::BuildContext { attempt }]
    }

    pub fn on_context_ready(&mut self, attempt: RequestId, context: ClientContext) -> Vec<Effect> {
        if self.phase != Phase::Initializing || self.init_attempt != Some(attempt) {
            tracing::debug!(attempt, "dropping superseded context result");
            return Vec::new();
        }

        self.init_attempt = None;
        if self.session_id.is_empty() {
            self.session_id = self
                .config
                .session_id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| context.session_id.clone());
        }
        self.context = Some(context);
        self.phase = Phase::Ready;
        tracing::info!(session_id = %self.session_id, "chat session ready");

        if self.is_open {
            self.start_initial_load()
        } else {
            Vec::new()
        }
    }

    pub fn on_context_failed(&mut self, attempt: RequestId, reason: impl fmt::Display) {
        if self.phase != Phase::Initializing || self.init_attempt != Some(attempt) {
            tracing::debug!(attempt, "dropping superseded context failure");
            return;
        }

        self.init_attempt = None;
        self.phase = Phase::Failed;
        self.error = Some(INIT_ERROR_BANNER.to_string());
        tracing::warn!(%reason, "chat session initialization failed");
    }

    /// Shows the widget; the first open of a ready, empty conversation loads history.
    pub fn open(&mut self) -> Vec<Effect> {
        self.is_open = true;
        if !self.messages.is_empty() {
            self.scroll.follow_new_content();
        }
        if self.is_ready() {
            self.start_initial_load()
        } else {
            Vec::new()
        }
    }

    /// Hides the widget; state is kept for the next open.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    fn start_initial_load(&mut self) -> Vec<Effect> {
        if self.initial_load != InitialLoad::Pending {
            return Vec::new();
        }
        if !self.messages.is_empty() {
            self.initial_load = InitialLoad::Done;
            return Vec::new();
        }

        let tag = self.next_tag();
        self.initial_load = InitialLoad::Loading(tag.request_id);
        vec![Effect::FetchHistory {
            tag,
            kind: HistoryKind::Initial,
            offset: 0,
            limit: INITIAL_PAGE_SIZE,
        }]
    }

    /// Requests the next older page, capturing the viewport first.
    pub fn load_older(&mut self, metrics: ScrollMetrics) -> Result<Vec<Effect>, Rejection> {
        if !self.is_ready() {
            return Err(Rejection::Uninitialized);
        }
        if self.loading_older.is_some() || self.is_loading_initial() {
            return Err(Rejection::AlreadyLoading);
        }
        if !self.cursor.has_more {
            return Err(Rejection::NoMoreHistory);
        }

        self.scroll.capture(metrics);
        let tag = self.next_tag();
        self.loading_older = Some(tag.request_id);
        Ok(vec![Effect::FetchHistory {
            tag,
            kind: HistoryKind::Older,
            offset: self.cursor.offset,
            limit: OLDER_PAGE_SIZE,
        }])
    }

    pub fn on_input_replace(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Optimistically appends the user message and a reply placeholder.
    pub fn submit(&mut self) -> Result<Vec<Effect>, Rejection> {
        if !self.is_ready() {
            return Err(Rejection::Uninitialized);
        }
        let query = self.input.trim();
        if query.is_empty() {
            return Err(Rejection::EmptyInput);
        }
        if self.sending.is_some() {
            return Err(Rejection::SendInFlight);
        }

        let query = query.to_string();
        let message_id = format!("msg_{}", Uuid::new_v4());
        let tag = self.next_tag();

        self.messages.push(Message::user(query.clone()));
        self.messages.push(Message::placeholder(message_id.clone()));
        self.input.clear();
        self.sending = Some(PendingSend {
            request_id: tag.request_id,
            message_id: message_id.clone(),
        });
        self.scroll.force_follow();

        Ok(vec![Effect::SendMessage {
            tag,
            query,
            message_id,
        }])
    }

    pub fn on_history_loaded(&mut self, tag: &RequestTag, page: HistoryPage) {
        let Some(kind) = self.history_kind_for(tag) else {
            tracing::debug!(request_id = tag.request_id, "dropping stale history page");
            return;
        };

        match kind {
            HistoryKind::Initial => {
                self.initial_load = InitialLoad::Done;
                if page.messages.is_empty() {
                    self.install_welcome();
                } else {
                    let count = page.messages.len();
                    self.prepend(page.messages);
                    self.cursor = PaginationCursor {
                        offset: count,
                        has_more: page.has_more,
                    };
                }
                self.scroll.force_follow();
            }
            HistoryKind::Older => {
                self.loading_older = None;
                if page.messages.is_empty() {
                    self.cursor.has_more = false;
                    self.scroll.discard_capture();
                } else {
                    let count = page.messages.len();
                    self.prepend(page.messages);
                    self.cursor.offset += count;
                    self.cursor.has_more = page.has_more;
                    self.scroll.commit_restore();
                }
            }
        }
    }

    pub fn on_history_failed(&mut self, tag: &RequestTag, reason: impl fmt::Display) {
        let Some(kind) = self.history_kind_for(tag) else {
            tracing::debug!(request_id = tag.request_id, "dropping stale history failure");
            return;
        };

        match kind {
            HistoryKind::Initial => {
                tracing::warn!(%reason, "initial history load failed; showing greeting");
                self.initial_load = InitialLoad::Done;
                self.install_welcome();
                self.scroll.force_follow();
            }
            HistoryKind::Older => {
                tracing::warn!(%reason, offset = self.cursor.offset, "failed to load older messages");
                self.loading_older = None;
                self.scroll.discard_capture();
            }
        }
    }

    pub fn on_reply(&mut self, tag: &RequestTag, reply: String) {
        let Some(pending) = self.take_pending_send(tag) else {
            tracing::debug!(request_id = tag.request_id, "dropping stale reply");
            return;
        };

        match self
            .messages
            .iter_mut()
            .find(|message| message.is_placeholder_for(&pending.message_id))
        {
            Some(placeholder) => *placeholder = Message::assistant(reply),
            None => self.messages.push(Message::assistant(reply)),
        }
        self.scroll.force_follow();
    }

    pub fn on_send_failed(&mut self, tag: &RequestTag, reason: impl fmt::Display) {
        let Some(pending) = self.take_pending_send(tag) else {
            tracing::debug!(request_id = tag.request_id, "dropping stale send failure");
            return;
        };

        tracing::warn!(%reason, message_id = %pending.message_id, "failed to send message");
        self.messages
            .retain(|message| !message.is_placeholder_for(&pending.message_id));
        self.messages.push(Message::assistant(SEND_APOLOGY));
        self.scroll.force_follow();
    }

    /// Starts a fresh conversation under `new_session_id`.
    ///
    /// Outstanding requests belong to the previous session and are dropped
    /// when they complete.
    pub fn reset_session(&mut self, new_session_id: impl Into<String>) {
        self.session_id = new_session_id.into();
        self.messages = vec![Message::assistant(RESET_MESSAGE)];
        self.cursor = PaginationCursor::default();
        self.initial_load = InitialLoad::Done;
        self.loading_older = None;
        self.sending = None;
        self.error = None;
        self.scroll.reset();
        tracing::info!(session_id = %self.session_id, "chat session reset");
    }

    pub fn on_user_scroll(&mut self, metrics: ScrollMetrics) {
        self.scroll.on_user_scroll(metrics);
    }

    pub fn after_render(&mut self, metrics: ScrollMetrics) -> Option<ScrollCommand> {
        self.scroll.after_render(metrics)
    }

    /// The jump-to-bottom affordance was used.
    pub fn jump_to_bottom(&mut self) {
        self.scroll.force_follow();
    }

    fn install_welcome(&mut self) {
        let greeting = Message::assistant(self.config.greeting());
        self.messages.insert(0, greeting);
        self.cursor.has_more = false;
    }

    fn prepend(&mut self, older: Vec<ChatMessage>) {
        let mut merged: Vec<Message> = older.into_iter().map(Message::from).collect();
        merged.append(&mut self.messages);
        self.messages = merged;
    }

    fn history_kind_for(&self, tag: &RequestTag) -> Option<HistoryKind> {
        if tag.session_id != self.session_id {
            return None;
        }
        if self.initial_load == InitialLoad::Loading(tag.request_id) {
            return Some(HistoryKind::Initial);
        }
        if self.loading_older == Some(tag.request_id) {
            return Some(HistoryKind::Older);
        }
        None
    }

    fn take_pending_send(&mut self, tag: &RequestTag) -> Option<PendingSend> {
        if tag.session_id != self.session_id {
            return None;
        }
        match &self.sending {
            Some(pending) if pending.request_id == tag.request_id => self.sending.take(),
            _ => None,
        }
    }

    fn next_tag(&mut self) -> RequestTag {
        RequestTag {
            request_id: self.allocate_request_id(),
            session_id: self.session_id.clone(),
        }
    }

    fn allocate_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }
}
