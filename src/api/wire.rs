// ABOUTME: Request and response bodies exchanged with the DOM360 REST backend
// ABOUTME: Converts chat responses into canonical messages with usage resolved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use dom360_core::models::message::{deserialize_tool_calls, value_as_count};
use dom360_core::models::{
    deserialize_optional_string_like, AgentType, ConversationId, Identity, InboxId, Message,
    MessageId, MessageRole, RagSnippet, TenantId, TokenUsage, UserRole,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// User text
    pub message: &'a str,
    /// Conversation to continue; `null` starts a new one
    pub conversation_id: Option<&'a ConversationId>,
    /// Persona that should answer
    pub agent_type: AgentType,
    /// Lead phone in E.164
    pub user_phone: &'a str,
    /// Name shown to the agent
    pub user_name: &'a str,
}

/// Message echoed or produced by `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessagePayload {
    /// Server id
    pub id: MessageId,
    /// Position in the conversation
    #[serde(default, deserialize_with = "optional_count")]
    pub index: Option<u64>,
    /// Text
    #[serde(default)]
    pub content: String,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub created_at: Option<String>,
    /// Tool invocations
    #[serde(default, deserialize_with = "deserialize_tool_calls")]
    pub tool_calls: Vec<String>,
    /// Retrieved context
    #[serde(default)]
    pub rag_context: Option<Vec<RagSnippet>>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// Backend latency
    #[serde(default, deserialize_with = "optional_count")]
    pub latency_ms: Option<u64>,
    /// Model that answered
    #[serde(default, alias = "model_used")]
    pub model: Option<String>,
}

impl ChatMessagePayload {
    /// Convert into a canonical message; `now` fills a missing timestamp
    #[must_use]
    pub fn into_message(self, role: MessageRole, now: &str) -> Message {
        let mut message = Message::new(
            self.id,
            role,
            self.content,
            self.created_at.unwrap_or_else(|| now.to_owned()),
        );
        message.index = self.index;
        message.tool_calls = self.tool_calls;
        message.rag_context = self.rag_context.unwrap_or_default();
        message.model = self
            .model
            .or_else(|| self.usage.as_ref().and_then(|u| u.model.clone()));
        message.usage = self.usage;
        message.latency_ms = self.latency_ms;
        message.without_assistant_metadata()
    }
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Conversation the exchange belongs to
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
    /// Server copy of the user message
    pub user_message: ChatMessagePayload,
    /// Agent reply
    pub assistant_message: ChatMessagePayload,
    /// Usage reported outside the assistant message
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// Latency reported outside the assistant message
    #[serde(default, deserialize_with = "optional_count")]
    pub latency_ms: Option<u64>,
}

/// Confirmed exchange produced by one successful send
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    /// Conversation id returned by the backend
    pub conversation_id: Option<ConversationId>,
    /// Server copy of the user message
    pub user_message: Message,
    /// Agent reply
    pub assistant_message: Message,
    /// Usage of the exchange, assistant message first
    pub usage: Option<TokenUsage>,
    /// Latency of the exchange, assistant message first
    pub latency_ms: u64,
}

impl ChatResponse {
    /// Resolve the response into an exchange
    ///
    /// Usage and latency on the assistant message take precedence over the
    /// top-level fields.
    #[must_use]
    pub fn into_exchange(self, now: &str) -> ChatExchange {
        let usage = self
            .assistant_message
            .usage
            .clone()
            .or(self.usage);
        let latency_ms = self
            .assistant_message
            .latency_ms
            .or(self.latency_ms)
            .unwrap_or(0);

        let mut assistant_message = self.assistant_message.into_message(MessageRole::Assistant, now);
        if assistant_message.usage.is_none() {
            assistant_message.usage.clone_from(&usage);
        }
        if assistant_message.latency_ms.is_none() && latency_ms > 0 {
            assistant_message.latency_ms = Some(latency_ms);
        }

        ChatExchange {
            conversation_id: self.conversation_id,
            user_message: self.user_message.into_message(MessageRole::User, now),
            assistant_message,
            usage,
            latency_ms,
        }
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email
    pub email: &'a str,
    /// Account password
    pub password: &'a str,
}

/// Account record returned by the login endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    /// Account id
    #[serde(default, deserialize_with = "deserialize_optional_string_like")]
    pub id: Option<String>,
    /// Tenant of the account
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// Role of the account
    pub role: UserRole,
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Assigned inbox
    #[serde(default)]
    pub inbox_id: Option<InboxId>,
}

impl From<LoginUser> for Identity {
    fn from(user: LoginUser) -> Self {
        Self {
            user_id: user.id.unwrap_or_default(),
            tenant_id: user.tenant_id,
            role: user.role,
            username: user.username,
            email: user.email,
            name: user.name,
            inbox_id: user.inbox_id,
        }
    }
}

/// Response of `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub access_token: String,
    /// Account record
    pub user: LoginUser,
}

/// Health endpoint body
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Reported status, usually `healthy`
    #[serde(default)]
    pub status: String,
    /// Any further fields the backend reports
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

fn optional_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.filter(|v| !v.is_null()).map(|v| value_as_count(&v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assistant_usage_wins_over_top_level() {
        let response: ChatResponse = serde_json::from_value(json!({
            "conversation_id": 42,
            "user_message": {"id": 1, "index": 1, "content": "Olá", "created_at": "2025-01-14T10:00:00Z"},
            "assistant_message": {
                "id": 2, "index": 2, "content": "Oi!",
                "usage": {"total_tokens": 120},
                "latency_ms": 350
            },
            "usage": {"total_tokens": 999},
            "latency_ms": 1
        }))
        .unwrap();

        let exchange = response.into_exchange("2025-01-14T10:00:01Z");
        assert_eq!(exchange.conversation_id, Some(ConversationId::Numeric(42)));
        assert_eq!(exchange.usage.map(|u| u.total_tokens), Some(120));
        assert_eq!(exchange.latency_ms, 350);
        assert_eq!(exchange.assistant_message.created_at, "2025-01-14T10:00:01Z");
        assert_eq!(exchange.user_message.role, MessageRole::User);
    }

    #[test]
    fn test_top_level_usage_is_copied_onto_reply() {
        let response: ChatResponse = serde_json::from_value(json!({
            "conversation_id": "c-1",
            "user_message": {"id": "m1", "content": "hi"},
            "assistant_message": {"id": "m2", "content": "hello", "tool_calls": null},
            "usage": {"input_tokens": 10, "output_tokens": 5, "total_tokens": 15},
            "latency_ms": 80.4
        }))
        .unwrap();

        let exchange = response.into_exchange("now");
        assert_eq!(exchange.latency_ms, 80);
        assert_eq!(
            exchange.assistant_message.usage.as_ref().map(|u| u.total_tokens),
            Some(15)
        );
        assert_eq!(exchange.assistant_message.latency_ms, Some(80));
    }

    #[test]
    fn test_login_user_into_identity() {
        let response: LoginResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "user": {"id": 7, "tenant_id": 3, "role": "TENANT_USER", "email": "ana@dom360.com"}
        }))
        .unwrap();
        let identity = Identity::from(response.user);
        assert_eq!(identity.user_id, "7");
        assert_eq!(identity.tenant_id, Some(TenantId::new("3")));
        assert_eq!(identity.role, UserRole::TenantUser);
    }
}
