// ABOUTME: Chat session core: optimistic send, confirmation, history load, agent switching
// ABOUTME: Enforces one in-flight send and records usage metrics for each confirmed exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Chat Session
//!
//! A [`ChatSession`] owns the message list of the active conversation. Sending
//! is a small state machine:
//!
//! ```text
//! Idle --send(non-blank)--> Sending --ok--> Idle (temp replaced by user + assistant)
//!                                   --err-> Idle (temp removed, error retained)
//! ```
//!
//! A send arriving while another is in flight is ignored, never queued. The
//! session lock is released while the request is on the wire; clearing,
//! switching persona or loading another conversation in the meantime bumps a
//! generation counter so the late result only updates metrics.

/// Session state and transitions
pub mod state;

pub use state::{PendingSend, SendPhase, SessionState};

use crate::api::{ApiClient, ChatExchange, SendChat};
use crate::auth::AuthSession;
use crate::history::ConversationHistory;
use crate::metrics::MetricsStore;
use crate::routing::RoutingContext;
use crate::settings::ChatSettings;
use chrono::{DateTime, SecondsFormat, Utc};
use dom360_core::constants::defaults;
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{
    derive_title, AgentType, ConversationId, Identity, Message, SavedConversation, SessionMetrics,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Why a send did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Text was empty or whitespace
    EmptyMessage,
    /// Another send is awaiting the backend
    SendInFlight,
}

/// Result of [`ChatSession::send_message`]
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Backend confirmed the exchange
    Delivered(ChatExchange),
    /// Nothing was sent
    Ignored(IgnoreReason),
}

/// Routing and lead details fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Tenant and inbox the conversation belongs to
    pub routing: RoutingContext,
    /// Lead phone sent with every message
    pub user_phone: String,
}

/// Active chat conversation
#[derive(Debug)]
pub struct ChatSession {
    api: Arc<ApiClient>,
    auth: Arc<AuthSession>,
    metrics: Arc<MetricsStore>,
    context: SessionContext,
    state: Mutex<SessionState>,
}

fn now_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ChatSession {
    /// Create a session routed to the tenant and inbox in `context`
    ///
    /// Every request of the session carries its own routing headers; the
    /// client-wide default routing of `api` is neither read nor changed.
    #[must_use]
    pub fn new(
        api: Arc<ApiClient>,
        auth: Arc<AuthSession>,
        metrics: Arc<MetricsStore>,
        context: SessionContext,
        agent_type: AgentType,
    ) -> Self {
        info!(
            tenant_id = %context.routing.tenant_id,
            inbox_id = %context.routing.inbox_id,
            agent_type = %agent_type,
            "Chat session started"
        );
        Self {
            api,
            auth,
            metrics,
            context,
            state: Mutex::new(SessionState::new(agent_type)),
        }
    }

    /// Create a session for a signed-in identity using its settings
    ///
    /// # Errors
    ///
    /// Returns a validation error when routing cannot be resolved
    pub fn for_identity(
        api: Arc<ApiClient>,
        auth: Arc<AuthSession>,
        metrics: Arc<MetricsStore>,
        identity: &Identity,
        settings: &ChatSettings,
    ) -> ClientResult<Self> {
        let routing = RoutingContext::resolve(identity, settings)?;
        let user_phone = if settings.phone.trim().is_empty() {
            defaults::PHONE.to_owned()
        } else {
            settings.phone.clone()
        };
        Ok(Self::new(
            api,
            auth,
            metrics,
            SessionContext {
                routing,
                user_phone,
            },
            settings.agent_type,
        ))
    }

    /// Send a user message
    ///
    /// Blank text and sends made while another is in flight are ignored
    /// without touching state or the network.
    ///
    /// # Errors
    ///
    /// Returns the request error; the optimistic message has been removed and
    /// the error is retained as [`Self::last_error`]. An authentication error
    /// also logs the user out.
    pub async fn send_message(
        &self,
        text: &str,
        display_name: Option<&str>,
    ) -> ClientResult<SendOutcome> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored(IgnoreReason::EmptyMessage));
        }

        let pending = {
            let mut state = self.state.lock().await;
            match state.begin_send(text, &now_iso(Utc::now())) {
                Some(pending) => pending,
                None => {
                    debug!("Send ignored, another send is in flight");
                    return Ok(SendOutcome::Ignored(IgnoreReason::SendInFlight));
                }
            }
        };
        let inbox_id = self.context.routing.inbox_id.clone();

        let result = self
            .api
            .send_chat_routed(
                &self.context.routing,
                SendChat {
                    message: text,
                    conversation_id: pending.conversation_id.as_ref(),
                    agent_type: pending.agent_type,
                    user_phone: &self.context.user_phone,
                    user_name: display_name
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or(defaults::USER_NAME),
                },
            )
            .await;
        let arrival = Utc::now();

        let mut state = self.state.lock().await;
        match result {
            Ok(exchange) => {
                if let Some(usage) = &exchange.usage {
                    self.metrics
                        .record(usage, exchange.latency_ms, &inbox_id, arrival);
                }
                if state.complete_send(&pending, &exchange) {
                    debug!(
                        conversation_id = ?state.conversation_id.as_ref().map(ToString::to_string),
                        latency_ms = exchange.latency_ms,
                        "Exchange confirmed"
                    );
                } else {
                    debug!("Exchange arrived after the conversation changed, messages discarded");
                }
                Ok(SendOutcome::Delivered(exchange))
            }
            Err(error) => {
                warn!(error = %error, "Send failed");
                state.fail_send(&pending, &error);
                drop(state);
                self.auth.handle_error(&error);
                Err(error)
            }
        }
    }

    /// Replace the message list with a stored conversation
    ///
    /// Accepts a bare id or anything convertible into one, such as a
    /// [`SavedConversation`]. Metrics are never touched. Returns `false` when a
    /// later clear, switch or load superseded this one before it finished.
    ///
    /// # Errors
    ///
    /// Returns the request error, retained as [`Self::last_error`]
    pub async fn load_conversation(&self, target: impl Into<ConversationId>) -> ClientResult<bool> {
        let id = target.into();
        let generation = self.state.lock().await.bump_generation();

        let result = self
            .api
            .conversation_messages_routed(&self.context.routing, &id)
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(conversation_id = %id, "Conversation load superseded");
            if let Err(error) = &result {
                drop(state);
                self.auth.handle_error(error);
            }
            return result.map(|_| false);
        }

        match result {
            Ok(messages) => {
                info!(conversation_id = %id, messages = messages.len(), "Conversation loaded");
                state.messages = messages;
                state.conversation_id = Some(id);
                state.last_error = None;
                Ok(true)
            }
            Err(error) => {
                warn!(conversation_id = %id, error = %error, "Conversation load failed");
                state.last_error = Some(error.clone());
                drop(state);
                self.auth.handle_error(&error);
                Err(error)
            }
        }
    }

    /// Switch persona; always starts a new logical conversation
    pub async fn switch_agent(&self, agent_type: AgentType) {
        let mut state = self.state.lock().await;
        state.reset();
        state.agent_type = agent_type;
        info!(agent_type = %agent_type, "Agent switched");
    }

    /// Switch persona by wire name; unknown names change nothing
    pub async fn switch_agent_by_name(&self, name: &str) -> bool {
        match AgentType::parse(name) {
            Some(agent_type) => {
                self.switch_agent(agent_type).await;
                true
            }
            None => {
                debug!(name, "Ignoring unknown agent type");
                false
            }
        }
    }

    /// Reset messages, conversation id and error; metrics are untouched
    pub async fn clear_conversation(&self) {
        self.state.lock().await.reset();
        debug!("Conversation cleared");
    }

    /// History entry for the current conversation
    ///
    /// `None` until the conversation has an id and more than one confirmed message.
    pub async fn snapshot_for_history(&self) -> Option<SavedConversation> {
        let state = self.state.lock().await;
        let id = state.conversation_id.clone()?;
        let messages = state.confirmed_messages();
        drop(state);
        if messages.len() <= 1 {
            return None;
        }

        let now = Utc::now();
        Some(SavedConversation {
            id,
            title: derive_title(&messages),
            metrics: SessionMetrics::from_messages(&messages),
            messages,
            phone: self.context.user_phone.clone(),
            tenant_id: Some(self.context.routing.tenant_id.clone()),
            inbox_id: Some(self.context.routing.inbox_id.clone()),
            created_at: now,
            updated_at: now,
        })
    }

    /// Save the conversation to history when auto-save and local storage are on
    ///
    /// Returns whether an entry was written.
    pub async fn autosave(&self, history: &ConversationHistory, settings: &ChatSettings) -> bool {
        if !(settings.auto_save && settings.store_locally) {
            return false;
        }
        match self.snapshot_for_history().await {
            Some(snapshot) => history.save(snapshot),
            None => false,
        }
    }

    /// Messages, including the optimistic one while sending
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    /// Server conversation id, once known
    pub async fn conversation_id(&self) -> Option<ConversationId> {
        self.state.lock().await.conversation_id.clone()
    }

    /// Active persona
    pub async fn agent_type(&self) -> AgentType {
        self.state.lock().await.agent_type
    }

    /// Whether a send is awaiting the backend
    pub async fn is_sending(&self) -> bool {
        self.state.lock().await.phase == SendPhase::Sending
    }

    /// Error of the last failed send or load
    pub async fn last_error(&self) -> Option<ClientError> {
        self.state.lock().await.last_error.clone()
    }

    /// Routing and lead details of the session
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }
}
