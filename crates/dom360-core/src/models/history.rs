// ABOUTME: Saved conversation snapshot for the history list with derived title and session metrics
// ABOUTME: Title is the last user message truncated to 50 characters, with a fallback label
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use super::{ConversationId, InboxId, Message, MessageRole, TenantId};
use crate::constants::defaults::{CONVERSATION_TITLE, TITLE_MAX_CHARS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage totals of a single conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    /// Messages in the conversation
    #[serde(default)]
    pub message_count: u64,
    /// Tokens consumed by the conversation's replies
    #[serde(default)]
    pub total_tokens: u64,
    /// Sum of reply latencies
    #[serde(default, rename = "totalLatency")]
    pub total_latency_ms: u64,
}

impl SessionMetrics {
    /// Compute the totals from a message list
    #[must_use]
    pub fn from_messages(messages: &[Message]) -> Self {
        messages.iter().fold(
            Self {
                message_count: messages.len() as u64,
                ..Self::default()
            },
            |mut acc, message| {
                if let Some(usage) = &message.usage {
                    acc.total_tokens = acc.total_tokens.saturating_add(usage.total_tokens);
                }
                acc.total_latency_ms = acc
                    .total_latency_ms
                    .saturating_add(message.latency_ms.unwrap_or(0));
                acc
            },
        )
    }
}

/// Conversation snapshot kept in the local history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConversation {
    /// Server conversation id
    pub id: ConversationId,
    /// Title shown in the history list
    #[serde(default)]
    pub title: String,
    /// Confirmed messages at save time
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Phone the conversation was held with
    #[serde(default)]
    pub phone: String,
    /// Usage totals at save time
    #[serde(default)]
    pub metrics: SessionMetrics,
    /// Tenant routing context
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// Inbox routing context
    #[serde(default)]
    pub inbox_id: Option<InboxId>,
    /// First save
    pub created_at: DateTime<Utc>,
    /// Latest save
    pub updated_at: DateTime<Utc>,
}

impl SavedConversation {
    /// Title to display, tolerating blank titles from older stored entries
    #[must_use]
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            CONVERSATION_TITLE
        } else {
            title
        }
    }
}

impl From<&SavedConversation> for ConversationId {
    fn from(conversation: &SavedConversation) -> Self {
        conversation.id.clone()
    }
}

/// Title for a message list: the last user message, truncated
#[must_use]
pub fn derive_title(messages: &[Message]) -> String {
    let text = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.trim())
        .unwrap_or_default();

    if text.is_empty() {
        return CONVERSATION_TITLE.to_owned();
    }

    if text.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageId, TokenUsage};

    fn message(id: i64, role: MessageRole, content: &str) -> Message {
        Message::new(MessageId::from(id), role, content, "2025-01-14T10:00:00Z")
    }

    #[test]
    fn test_title_uses_last_user_message() {
        let messages = vec![
            message(1, MessageRole::User, "first question"),
            message(2, MessageRole::Assistant, "answer"),
            message(3, MessageRole::User, "  follow up  "),
            message(4, MessageRole::Assistant, "answer"),
        ];
        assert_eq!(derive_title(&messages), "follow up");
    }

    #[test]
    fn test_title_truncates_on_char_boundary() {
        let long = "ç".repeat(60);
        let messages = vec![message(1, MessageRole::User, &long)];
        let title = derive_title(&messages);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
    }

    #[test]
    fn test_title_falls_back_when_blank() {
        assert_eq!(derive_title(&[]), CONVERSATION_TITLE);
        let messages = vec![message(1, MessageRole::User, "   ")];
        assert_eq!(derive_title(&messages), CONVERSATION_TITLE);
    }

    #[test]
    fn test_session_metrics_from_messages() {
        let mut reply = message(2, MessageRole::Assistant, "ok");
        reply.usage = Some(TokenUsage {
            total_tokens: 120,
            ..TokenUsage::default()
        });
        reply.latency_ms = Some(350);
        let metrics = SessionMetrics::from_messages(&[message(1, MessageRole::User, "Olá"), reply]);
        assert_eq!(metrics.message_count, 2);
        assert_eq!(metrics.total_tokens, 120);
        assert_eq!(metrics.total_latency_ms, 350);
    }
}
