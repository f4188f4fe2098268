// ABOUTME: Conversation turn model with role, content, tool calls, RAG context and token usage
// ABOUTME: Includes lenient serde helpers for tool-call labels and retrieval scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use super::MessageId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user
    User,
    /// Reply from the agent
    Assistant,
    /// Out-of-band notice
    System,
}

impl MessageRole {
    /// Convert to the wire string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    /// Parse a wire string, rejecting anything outside the three roles
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token consumption reported for one exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    #[serde(default, deserialize_with = "lenient_count")]
    pub input_tokens: u64,
    /// Completion tokens
    #[serde(default, deserialize_with = "lenient_count")]
    pub output_tokens: u64,
    /// Prompt tokens served from cache
    #[serde(default, deserialize_with = "lenient_count")]
    pub cached_tokens: u64,
    /// Total billed tokens
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_tokens: u64,
    /// Model that produced the reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// One retrieved knowledge snippet attached to an assistant reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagSnippet {
    /// Relevance score in `[0, 1]`
    #[serde(default, deserialize_with = "unit_score")]
    pub score: f64,
    /// Snippet text
    #[serde(default, alias = "content", alias = "text")]
    pub snippet: String,
    /// Source document, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server id, or a local placeholder while `is_temp`
    pub id: MessageId,
    /// Server-assigned position in the conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    /// Who produced the message
    pub role: MessageRole,
    /// Markdown-capable text payload
    pub content: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// Tool invocation labels (assistant messages only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<String>,
    /// Retrieved context (assistant messages only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rag_context: Vec<RagSnippet>,
    /// Token usage (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Backend latency (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Model that produced the reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Optimistic local copy awaiting confirmation; never persisted
    #[serde(skip)]
    pub is_temp: bool,
}

impl Message {
    /// Create a plain message with no assistant metadata
    #[must_use]
    pub fn new(
        id: MessageId,
        role: MessageRole,
        content: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            index: None,
            role,
            content: content.into(),
            created_at: created_at.into(),
            tool_calls: Vec::new(),
            rag_context: Vec::new(),
            usage: None,
            latency_ms: None,
            model: None,
            is_temp: false,
        }
    }

    /// Create the optimistic user message shown before the server confirms it
    #[must_use]
    pub fn temp_user(
        id: MessageId,
        content: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            is_temp: true,
            ..Self::new(id, MessageRole::User, content, created_at)
        }
    }

    /// Drop fields that only assistant messages may carry
    #[must_use]
    pub fn without_assistant_metadata(mut self) -> Self {
        if self.role != MessageRole::Assistant {
            self.tool_calls.clear();
            self.rag_context.clear();
            self.usage = None;
            self.latency_ms = None;
        }
        self
    }
}

/// Deserialize tool calls as labels
///
/// Accepts `null`, plain strings, or objects naming the tool under `name`,
/// `tool` or `function.name`. Objects without a name keep their JSON text.
///
/// # Errors
///
/// Returns an error if the value is not null or an array
pub fn deserialize_tool_calls<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().iter().map(tool_call_label).collect())
}

/// Label for one tool call entry
#[must_use]
pub fn tool_call_label(entry: &Value) -> String {
    match entry {
        Value::String(label) => label.clone(),
        Value::Object(fields) => fields
            .get("name")
            .or_else(|| fields.get("tool"))
            .or_else(|| fields.get("function").and_then(|f| f.get("name")))
            .and_then(Value::as_str)
            .map_or_else(|| entry.to_string(), str::to_owned),
        other => other.to_string(),
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map_or(0, value_as_count))
}

/// Read a token count or latency from a JSON value, treating junk as zero
#[must_use]
pub fn value_as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn unit_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|s| s.is_finite()).map_or(0.0, |s| s.clamp(0.0, 1.0)))
}
