//! Async driver that carries out controller effects against real collaborators.

use std::collections::VecDeque;
use std::time::Duration;

use widget_api::{AddressLookupClient, ChatApiClient, TransportError};
use widget_identity::IdentityStore;

use crate::config::{EnvConfig, LookupConfig, WidgetConfig};
use crate::context::{build_context, AddressLookup, Environment, EnvironmentProbe};
use crate::controller::{ConversationController, Effect, Rejection};
use crate::scroll::{ScrollCommand, ScrollMetrics};
use crate::transport::ChatTransport;

/// Owns a [`ConversationController`] and executes its effects in order.
///
/// Effects are queued and drained one at a time, so a send or page fetch
/// completes before the next intent is handled. Hosts that need overlapping
/// requests can drive the controller directly.
pub struct WidgetRuntime {
    controller: ConversationController,
    identity: IdentityStore,
    transport: Box<dyn ChatTransport>,
    lookup: Box<dyn AddressLookup>,
    probe: Box<dyn EnvironmentProbe>,
    lookup_timeout: Duration,
    pending: VecDeque<Effect>,
}

impl WidgetRuntime {
    pub fn new(
        config: WidgetConfig,
        identity: IdentityStore,
        transport: impl ChatTransport + 'static,
        lookup: impl AddressLookup + 'static,
        probe: impl EnvironmentProbe + 'static,
    ) -> Self {
        Self {
            controller: ConversationController::new(config),
            identity,
            transport: Box::new(transport),
            lookup: Box::new(lookup),
            probe: Box::new(probe),
            lookup_timeout: LookupConfig::default().timeout,
            pending: VecDeque::new(),
        }
    }

    /// Wires the HTTP transport, the address lookup and the identity store
    /// from environment configuration.
    pub fn from_env(env: &EnvConfig) -> Result<Self, TransportError> {
        let lookup_config = LookupConfig::default();
        let transport = ChatApiClient::new(env.api_config())?;
        let lookup = AddressLookupClient::new(&lookup_config.url)?;
        let identity = match &env.store_dir {
            Some(root) => IdentityStore::with_durable_root(root),
            None => IdentityStore::in_memory(),
        };

        Ok(Self::new(
            env.widget_config(),
            identity,
            transport,
            lookup,
            Environment::detect(),
        )
        .with_lookup_timeout(lookup_config.timeout))
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn identity(&self) -> &IdentityStore {
        &self.identity
    }

    pub async fn mount(&mut self) {
        let effects = self.controller.mount();
        self.run(effects).await;
    }

    pub async fn retry_initialization(&mut self) {
        let effects = self.controller.retry_initialization();
        self.run(effects).await;
    }

    pub async fn open(&mut self) {
        let effects = self.controller.open();
        self.run(effects).await;
    }

    pub fn close(&mut self) {
        self.controller.close();
    }

    pub fn on_input_replace(&mut self, text: impl Into<String>) {
        self.controller.on_input_replace(text);
    }

    pub async fn submit(&mut self) -> Result<(), Rejection> {
        let effects = self.controller.submit()?;
        self.run(effects).await;
        Ok(())
    }

    pub async fn load_older(&mut self, metrics: ScrollMetrics) -> Result<(), Rejection> {
        let effects = self.controller.load_older(metrics)?;
        self.run(effects).await;
        Ok(())
    }

    /// Rotates the tab-scoped session id and starts a fresh conversation.
    pub fn reset_session(&mut self) -> String {
        let session_id = self.identity.reset_session();
        self.controller.reset_session(session_id.clone());
        session_id
    }

    pub fn on_user_scroll(&mut self, metrics: ScrollMetrics) {
        self.controller.on_user_scroll(metrics);
    }

    pub fn after_render(&mut self, metrics: ScrollMetrics) -> Option<ScrollCommand> {
        self.controller.after_render(metrics)
    }

    pub fn jump_to_bottom(&mut self) {
        self.controller.jump_to_bottom();
    }

    async fn run(&mut self, effects: Vec<Effect>) {
        self.pending.extend(effects);
        while let Some(effect) = self.pending.pop_front() {
            let follow_up = self.execute(effect).await;
            self.pending.extend(follow_up);
        }
    }

    async fn execute(&mut self, effect: Effect) -> Vec<Effect> {
        match effect {
            Effect::BuildContext { attempt } => {
                let result = build_context(
                    &self.identity,
                    self.lookup.as_ref(),
                    self.probe.as_ref(),
                    self.lookup_timeout,
                )
                .await;
                match result {
                    Ok(context) => self.controller.on_context_ready(attempt, context),
                    Err(error) => {
                        self.controller.on_context_failed(attempt, error);
                        Vec::new()
                    }
                }
            }
            Effect::FetchHistory {
                tag,
                kind,
                offset,
                limit,
            } => {
                let Some(context) = self.controller.context().cloned() else {
                    self.controller
                        .on_history_failed(&tag, Rejection::Uninitialized);
                    return Vec::new();
                };
                tracing::debug!(kind = kind.label(), offset, limit, "fetching history");
                let result = self
                    .transport
                    .fetch_history(&tag.session_id, offset, limit, &context, &context.user_id)
                    .await;
                match result {
                    Ok(page) => self.controller.on_history_loaded(&tag, page),
                    Err(error) => self.controller.on_history_failed(&tag, error),
                }
                Vec::new()
            }
            Effect::SendMessage {
                tag,
                query,
                message_id,
            } => {
                let Some(context) = self.controller.context().cloned() else {
                    self.controller.on_send_failed(&tag, Rejection::Uninitialized);
                    return Vec::new();
                };
                let result = self
                    .transport
                    .send_message(
                        &tag.session_id,
                        &query,
                        &context,
                        &context.user_id,
                        &message_id,
                    )
                    .await;
                match result {
                    Ok(reply) => self.controller.on_reply(&tag, reply),
                    Err(error) => self.controller.on_send_failed(&tag, error),
                }
                Vec::new()
            }
        }
    }
}
