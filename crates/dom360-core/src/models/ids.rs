// ABOUTME: Identifier newtypes for conversations, messages, tenants and inboxes
// ABOUTME: Accept both numeric and string ids from the backend and serialize them back unchanged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned conversation identifier
///
/// The backend has used both integer and UUID keys; the original JSON shape is
/// kept so the id can be echoed back in `conversation_id` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversationId {
    /// Integer primary key
    Numeric(i64),
    /// Opaque string key
    Text(String),
}

/// Message identifier (server-assigned, or a local placeholder for temp messages)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    /// Integer primary key
    Numeric(i64),
    /// Opaque string key
    Text(String),
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

/// Number-or-string form used by ids that travel as header values
#[derive(Deserialize)]
#[serde(untagged)]
enum StringLike {
    Number(i64),
    Text(String),
}

impl From<StringLike> for String {
    fn from(value: StringLike) -> Self {
        match value {
            StringLike::Number(n) => n.to_string(),
            StringLike::Text(s) => s,
        }
    }
}

/// Type-safe wrapper for tenant identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

/// Type-safe wrapper for inbox identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InboxId(String);

impl TenantId {
    /// Create a tenant id from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl InboxId {
    /// Create an inbox id from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StringLike::deserialize(deserializer).map(|raw| Self(raw.into()))
    }
}

impl<'de> Deserialize<'de> for InboxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StringLike::deserialize(deserializer).map(|raw| Self(raw.into()))
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<&str> for InboxId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Deserialize an optional id that may arrive as a number or a string
///
/// # Errors
///
/// Returns an error if the value is neither null, a number nor a string
pub fn deserialize_optional_string_like<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StringLike>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
