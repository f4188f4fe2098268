// ABOUTME: In-memory state of one chat session and its send state machine transitions
// ABOUTME: Generation counter invalidates in-flight results after clear, switch or load
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::api::ChatExchange;
use dom360_core::constants::defaults::TEMP_ID_PREFIX;
use dom360_core::errors::ClientError;
use dom360_core::models::{AgentType, ConversationId, Message, MessageId};
use uuid::Uuid;

/// Send state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendPhase {
    /// No send in flight
    #[default]
    Idle,
    /// One send awaiting the backend
    Sending,
}

/// Send accepted by [`SessionState::begin_send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// Id of the optimistic message
    pub temp_id: MessageId,
    /// Generation the send started in
    pub generation: u64,
    /// Conversation the send continues
    pub conversation_id: Option<ConversationId>,
    /// Persona at send time
    pub agent_type: AgentType,
}

/// Mutable session state, guarded by the session lock
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub(crate) messages: Vec<Message>,
    pub(crate) conversation_id: Option<ConversationId>,
    pub(crate) agent_type: AgentType,
    pub(crate) phase: SendPhase,
    pub(crate) last_error: Option<ClientError>,
    pub(crate) generation: u64,
}

impl SessionState {
    /// Fresh state for a persona
    #[must_use]
    pub fn new(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            ..Self::default()
        }
    }

    /// Enter `Sending` and append the optimistic user message
    ///
    /// Returns `None` while another send is in flight.
    pub fn begin_send(&mut self, text: &str, now: &str) -> Option<PendingSend> {
        if self.phase == SendPhase::Sending {
            return None;
        }
        let temp_id = MessageId::Text(format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4()));
        self.phase = SendPhase::Sending;
        self.last_error = None;
        self.messages
            .push(Message::temp_user(temp_id.clone(), text, now));
        Some(PendingSend {
            temp_id,
            generation: self.generation,
            conversation_id: self.conversation_id.clone(),
            agent_type: self.agent_type,
        })
    }

    /// Whether `pending` still belongs to the current message list
    #[must_use]
    pub const fn is_current(&self, pending: &PendingSend) -> bool {
        self.generation == pending.generation
    }

    /// Replace the optimistic message with the confirmed pair
    ///
    /// The optimistic message is removed even when the send was superseded;
    /// apart from that a superseded send leaves messages untouched and
    /// returns `false`.
    pub fn complete_send(&mut self, pending: &PendingSend, exchange: &ChatExchange) -> bool {
        self.phase = SendPhase::Idle;
        self.remove_message(&pending.temp_id);
        if !self.is_current(pending) {
            return false;
        }
        if self.conversation_id.is_none() {
            self.conversation_id.clone_from(&exchange.conversation_id);
        }
        self.messages.push(exchange.user_message.clone());
        self.messages.push(exchange.assistant_message.clone());
        true
    }

    /// Drop the optimistic message and retain the error
    ///
    /// A superseded send only drops its optimistic message and returns `false`.
    pub fn fail_send(&mut self, pending: &PendingSend, error: &ClientError) -> bool {
        self.phase = SendPhase::Idle;
        self.remove_message(&pending.temp_id);
        if !self.is_current(pending) {
            return false;
        }
        self.last_error = Some(error.clone());
        true
    }

    /// Start a new logical conversation; bumps the generation
    ///
    /// The send phase is kept: an in-flight send still owns the guard until
    /// its response arrives.
    pub fn reset(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.messages.clear();
        self.conversation_id = None;
        self.last_error = None;
        self.generation
    }

    /// Invalidate in-flight results without clearing the list
    pub fn bump_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.last_error = None;
        self.generation
    }

    /// Confirmed messages (no temp copy)
    #[must_use]
    pub fn confirmed_messages(&self) -> Vec<Message> {
        self.messages.iter().filter(|m| !m.is_temp).cloned().collect()
    }

    fn remove_message(&mut self, id: &MessageId) {
        self.messages.retain(|m| !(m.is_temp && &m.id == id));
    }
}
