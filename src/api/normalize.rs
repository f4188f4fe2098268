// ABOUTME: Normalizes heterogeneous conversation history payloads into canonical messages
// ABOUTME: Accepts bare arrays or {messages: [...]} and alternate field names per record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # History payload normalization
//!
//! The conversation messages endpoint has shipped several record shapes over
//! time. Each record is mapped field by field into a [`Message`]:
//!
//! | field        | accepted sources                                             |
//! |--------------|--------------------------------------------------------------|
//! | id           | `message_id`, `id`, else `msg_<position>`                    |
//! | index        | `message_index`, `index`, else position + 1                  |
//! | role         | `role`, `type`, else `user`                                  |
//! | content      | `content`, else `user_message` / `assistant_message`         |
//! | tool calls   | `tool_calls`, `metadata.tool_calls`                          |
//! | rag context  | `rag_context`, `metadata.rag_context`                        |
//! | latency      | `latency_ms`, `metadata.latency_ms`                          |
//! | usage        | `usage`, `tokens{input,output,total}`, flat `*_tokens`       |
//! | created at   | `created_at`, `createdAt`, else now                          |
//! | model        | `model_used`, `model`                                        |
//!
//! Records that are not objects or name an unknown role are rejected and
//! logged; the remaining records still load.

use dom360_core::models::message::{tool_call_label, value_as_count};
use dom360_core::models::{Message, MessageId, MessageRole, RagSnippet, TokenUsage};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Why a history record was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejection {
    /// Record is not a JSON object
    #[error("record is not an object")]
    NotAnObject,
    /// Record names a role outside user/assistant/system
    #[error("unknown message role '{0}'")]
    UnknownRole(String),
}

/// Extract the record list from either accepted envelope
///
/// Returns `None` when the payload is neither an array nor an object with a
/// `messages` array.
#[must_use]
pub fn message_records(payload: &Value) -> Option<&[Value]> {
    match payload {
        Value::Array(records) => Some(records.as_slice()),
        Value::Object(fields) => fields
            .get("messages")
            .and_then(Value::as_array)
            .map(Vec::as_slice),
        _ => None,
    }
}

/// Normalize every acceptable record of a history payload
///
/// Returns `None` for an unrecognized envelope. `now` fills missing timestamps.
#[must_use]
pub fn normalize_messages(payload: &Value, now: &str) -> Option<Vec<Message>> {
    let records = message_records(payload)?;
    let messages = records
        .iter()
        .enumerate()
        .filter_map(|(position, record)| match normalize_record(position, record, now) {
            Ok(message) => Some(message),
            Err(rejection) => {
                warn!(position, reason = %rejection, "Skipping history record");
                None
            }
        })
        .collect();
    Some(messages)
}

/// Normalize one history record found at `position`
///
/// # Errors
///
/// Returns a rejection when the record is not an object or its role is unknown
pub fn normalize_record(position: usize, record: &Value, now: &str) -> Result<Message, RecordRejection> {
    let fields = record.as_object().ok_or(RecordRejection::NotAnObject)?;
    let metadata = fields.get("metadata").and_then(Value::as_object);

    let role_name = first_str(fields, &["role", "type"]).unwrap_or("user");
    let role = MessageRole::parse(role_name)
        .ok_or_else(|| RecordRejection::UnknownRole(role_name.to_owned()))?;

    let id = first_present(fields, &["message_id", "id"])
        .and_then(message_id)
        .unwrap_or_else(|| MessageId::Text(format!("msg_{position}")));

    let index = first_present(fields, &["message_index", "index"])
        .map(value_as_count)
        .filter(|index| *index > 0)
        .unwrap_or(position as u64 + 1);

    let content = match fields.get("content").filter(|v| !v.is_null()) {
        Some(content) => text_of(content),
        None => {
            let alternate = if role == MessageRole::User {
                "user_message"
            } else {
                "assistant_message"
            };
            fields.get(alternate).map(text_of).unwrap_or_default()
        }
    };

    let created_at = first_str(fields, &["created_at", "createdAt"])
        .unwrap_or(now)
        .to_owned();

    let mut message = Message::new(id, role, content, created_at);
    message.index = Some(index);
    message.tool_calls = nested_array(fields, metadata, "tool_calls")
        .map(|calls| calls.iter().map(tool_call_label).collect())
        .unwrap_or_default();
    message.rag_context = nested_array(fields, metadata, "rag_context")
        .map(|entries| entries.iter().filter_map(rag_snippet).collect())
        .unwrap_or_default();
    message.latency_ms = nested_value(fields, metadata, "latency_ms").map(value_as_count);
    message.usage = usage(fields);
    message.model = first_str(fields, &["model_used", "model"])
        .map(str::to_owned)
        .or_else(|| message.usage.as_ref().and_then(|u| u.model.clone()));

    Ok(message.without_assistant_metadata())
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn first_str<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

fn nested_value<'a>(
    fields: &'a Map<String, Value>,
    metadata: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Value> {
    fields
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| metadata.and_then(|m| m.get(key)).filter(|v| !v.is_null()))
}

fn nested_array<'a>(
    fields: &'a Map<String, Value>,
    metadata: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Vec<Value>> {
    nested_value(fields, metadata, key).and_then(Value::as_array)
}

fn message_id(value: &Value) -> Option<MessageId> {
    match value {
        Value::Number(n) => n.as_i64().map(MessageId::Numeric),
        Value::String(s) if !s.is_empty() => Some(MessageId::Text(s.clone())),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn rag_snippet(entry: &Value) -> Option<RagSnippet> {
    match entry {
        Value::String(text) => Some(RagSnippet {
            snippet: text.clone(),
            ..RagSnippet::default()
        }),
        Value::Object(_) => serde_json::from_value(entry.clone()).ok(),
        _ => None,
    }
}

fn usage(fields: &Map<String, Value>) -> Option<TokenUsage> {
    if let Some(usage) = fields.get("usage").filter(|v| v.is_object()) {
        return serde_json::from_value(usage.clone()).ok();
    }

    if let Some(tokens) = fields.get("tokens").and_then(Value::as_object) {
        let count = |key: &str| tokens.get(key).map_or(0, value_as_count);
        return Some(TokenUsage {
            input_tokens: count("input"),
            output_tokens: count("output"),
            cached_tokens: count("cached"),
            total_tokens: count("total"),
            model: None,
        });
    }

    let flat = ["input_tokens", "output_tokens", "total_tokens"];
    if flat.iter().any(|key| fields.get(*key).is_some_and(|v| !v.is_null())) {
        let count = |key: &str| fields.get(key).map_or(0, value_as_count);
        return Some(TokenUsage {
            input_tokens: count("input_tokens"),
            output_tokens: count("output_tokens"),
            cached_tokens: count("cached_tokens"),
            total_tokens: count("total_tokens"),
            model: None,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: &str = "2025-01-14T12:00:00Z";

    #[test]
    fn test_both_envelopes_normalize_identically() {
        let records = json!([
            {"id": 1, "index": 1, "role": "user", "content": "Olá", "created_at": "2025-01-14T10:00:00Z"},
            {"id": 2, "index": 2, "role": "assistant", "content": "Oi!", "created_at": "2025-01-14T10:00:01Z"}
        ]);
        let wrapped = json!({"messages": records.clone()});

        let bare = normalize_messages(&records, NOW).unwrap();
        let nested = normalize_messages(&wrapped, NOW).unwrap();
        assert_eq!(bare, nested);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn test_unknown_envelope_is_rejected() {
        assert!(normalize_messages(&json!({"items": []}), NOW).is_none());
        assert!(normalize_messages(&json!("nope"), NOW).is_none());
    }

    #[test]
    fn test_alternate_field_names() {
        let record = json!({
            "message_id": "m-9",
            "message_index": 4,
            "type": "assistant",
            "assistant_message": "Posso ajudar?",
            "metadata": {
                "tool_calls": [{"name": "search_crm"}],
                "rag_context": [{"score": 0.8, "snippet": "pricing"}],
                "latency_ms": 420
            },
            "tokens": {"input": 10, "output": 20, "total": 30},
            "model_used": "nova-lite",
            "createdAt": "2025-01-14T10:00:00Z"
        });

        let message = normalize_record(0, &record, NOW).unwrap();
        assert_eq!(message.id, MessageId::from("m-9"));
        assert_eq!(message.index, Some(4));
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.content, "Posso ajudar?");
        assert_eq!(message.tool_calls, ["search_crm"]);
        assert_eq!(message.rag_context.len(), 1);
        assert_eq!(message.latency_ms, Some(420));
        assert_eq!(message.usage.as_ref().map(|u| u.total_tokens), Some(30));
        assert_eq!(message.model.as_deref(), Some("nova-lite"));
        assert_eq!(message.created_at, "2025-01-14T10:00:00Z");
    }

    #[test]
    fn test_missing_fields_default() {
        let message = normalize_record(2, &json!({"user_message": "oi"}), NOW).unwrap();
        assert_eq!(message.id, MessageId::from("msg_2"));
        assert_eq!(message.index, Some(3));
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.content, "oi");
        assert_eq!(message.created_at, NOW);
        assert!(message.tool_calls.is_empty());
        assert!(message.usage.is_none());
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let payload = json!([
            {"id": 1, "role": "user", "content": "a"},
            "garbage",
            {"id": 3, "role": "tool", "content": "b"},
            {"id": 4, "role": "assistant", "content": "c"}
        ]);
        let messages = normalize_messages(&payload, NOW).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].id, MessageId::from(4_i64));
        assert_eq!(
            normalize_record(2, &payload[2], NOW),
            Err(RecordRejection::UnknownRole("tool".into()))
        );
    }
}
