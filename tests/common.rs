// ABOUTME: Shared test utilities for chat client integration tests
// ABOUTME: Builds test JWTs, signed-in clients over in-memory storage and backend fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `dom360_chat`

use chrono::{Duration, Utc};
use dom360_chat::client::Dom360Client;
use dom360_chat::config::ClientConfig;
use dom360_chat::storage::Persistence;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_test_writer()
            .try_init();
    });
}

/// HS256 JWT carrying `claims`, signed with a key only the test backend knows
pub fn jwt(claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(b"test-backend-secret"),
    )
    .unwrap()
}

/// Token for a tenant user of tenant 1 with inbox 27, valid for an hour
pub fn tenant_user_token() -> String {
    jwt(&json!({
        "sub": "u-1",
        "tenant_id": "1",
        "role": "TENANT_USER",
        "username": "ana",
        "email": "ana@dom360.com",
        "name": "Ana",
        "inbox_id": "27",
        "exp": (Utc::now() + Duration::hours(1)).timestamp()
    }))
}

/// Token for a MASTER account, valid for an hour
pub fn master_token() -> String {
    jwt(&json!({
        "sub": "m-1",
        "role": "MASTER",
        "username": "root",
        "exp": (Utc::now() + Duration::hours(1)).timestamp()
    }))
}

/// Client against `base_url` over fresh in-memory media
pub fn client(base_url: &str) -> Dom360Client {
    init_test_logging();
    Dom360Client::with_persistence(
        ClientConfig::for_url(base_url),
        &Persistence::in_memory(),
        Persistence::in_memory(),
    )
    .unwrap()
}

/// Client signed in with `token` (remembered)
pub fn signed_in_client(base_url: &str, token: &str) -> Dom360Client {
    let client = client(base_url);
    assert!(client.api().tokens().save(token, true));
    assert!(client.auth().restore().is_some());
    client
}

/// Chat endpoint response for one exchange
pub fn chat_response(conversation_id: i64, total_tokens: u64, latency_ms: u64) -> Value {
    json!({
        "conversation_id": conversation_id,
        "user_message": {
            "id": 1,
            "index": 1,
            "content": "Olá",
            "created_at": "2025-01-14T10:00:00.000Z"
        },
        "assistant_message": {
            "id": 2,
            "index": 2,
            "content": "Olá! Como posso ajudar?",
            "tool_calls": [{"name": "search_crm"}],
            "rag_context": [{"score": 0.91, "snippet": "Plano Pro", "source": "pricing.md"}],
            "usage": {"input_tokens": 80, "output_tokens": 40, "total_tokens": total_tokens, "model": "amazon.nova-lite-v1:0"},
            "latency_ms": latency_ms,
            "created_at": "2025-01-14T10:00:01.000Z"
        }
    })
}
