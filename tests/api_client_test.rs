// ABOUTME: Integration tests for the API gateway client against a mocked backend
// ABOUTME: Covers auth and routing headers, status mapping, timeouts and listing endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use dom360_chat::api::{ApiClient, SendChat};
use dom360_chat::auth::TokenStore;
use dom360_chat::config::ClientConfig;
use dom360_chat::errors::{ClientError, ErrorCode};
use dom360_chat::models::{AgentType, ConversationId, InboxId, TenantId};
use dom360_chat::routing::RoutingContext;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(base_url: &str) -> ApiClient {
    common::init_test_logging();
    ApiClient::new(ClientConfig::for_url(base_url), TokenStore::in_memory()).unwrap()
}

fn send(message: &str) -> SendChat<'_> {
    SendChat {
        message,
        conversation_id: None,
        agent_type: AgentType::Sdr,
        user_phone: "+5511999999999",
        user_name: "Usuário",
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "database": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let health = api(&server.uri()).health_check().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.details["database"], "ok");
}

#[tokio::test]
async fn test_bearer_and_routing_headers_are_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .and(query_param("limit", "50"))
        .and(header("Authorization", "Bearer abc.def.ghi"))
        .and(header("X-Tenant-ID", "1"))
        .and(header("X-Inbox-ID", "27"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"conversations": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = api(&server.uri());
    client.tokens().save("abc.def.ghi", false);
    client.set_routing(TenantId::new("1"), Some(InboxId::new("27")));

    let listing = client.list_conversations(None).await.unwrap();
    assert_eq!(listing, json!({"conversations": []}));
}

#[tokio::test]
async fn test_routed_calls_ignore_default_routing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("X-Tenant-ID", "9"))
        .and(header("X-Inbox-ID", "31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::chat_response(5, 10, 20)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/5/messages"))
        .and(header("X-Tenant-ID", "9"))
        .and(header("X-Inbox-ID", "31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api(&server.uri());
    client.set_routing(TenantId::new("1"), Some(InboxId::new("27")));
    let routing = RoutingContext::new(TenantId::new("9"), InboxId::new("31"));

    let exchange = client.send_chat_routed(&routing, send("Olá")).await.unwrap();
    assert_eq!(exchange.conversation_id, Some(ConversationId::Numeric(5)));
    let id = ConversationId::Numeric(5);
    assert!(client
        .conversation_messages_routed(&routing, &id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(client.routing().inbox_id, Some(InboxId::new("27")));
}

#[tokio::test]
async fn test_send_requires_routing_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = api(&server.uri());
    let error = client.send_chat(send("Olá")).await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::ValidationError);

    client.set_routing(TenantId::new("1"), None);
    let error = client.send_chat(send("Olá")).await.unwrap_err();
    assert!(matches!(error, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_conversation_messages_needs_only_tenant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/42/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "role": "user", "content": "Olá"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api(&server.uri());
    let id = ConversationId::Numeric(42);
    assert!(matches!(
        client.conversation_messages(&id).await,
        Err(ClientError::Validation(_))
    ));

    client.set_routing(TenantId::new("1"), None);
    let messages = client.conversation_messages(&id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "Olá");
}

#[tokio::test]
async fn test_status_codes_map_to_error_taxonomy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/consumption"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Tenant mismatch"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/consumption"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = api(&server.uri());
    client.set_routing(TenantId::new("1"), Some(InboxId::new("27")));

    assert_eq!(
        client.consumption_dashboard(Some(7)).await.unwrap_err(),
        ClientError::AccessDenied("Tenant mismatch".into())
    );
    assert_eq!(
        client.consumption_dashboard(None).await.unwrap_err(),
        ClientError::request_failed(502, "HTTP 502 Bad Gateway")
    );
    let error = client.list_conversations(Some(10)).await.unwrap_err();
    assert!(error.requires_login());
}

#[tokio::test]
async fn test_undecodable_success_body_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = api(&server.uri());
    client.set_routing(TenantId::new("1"), Some(InboxId::new("27")));
    let error = client.send_chat(send("Olá")).await.unwrap_err();
    assert!(matches!(error, ClientError::RequestFailed { status: 200, .. }));
}

#[tokio::test]
async fn test_timeout_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = ClientConfig::for_url(server.uri());
    config.request_timeout = Duration::from_millis(100);
    let client = ApiClient::new(config, TokenStore::in_memory()).unwrap();

    let error = client.health_check().await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::ConnectionError);
    assert!(error.user_message().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_backend_is_connection_error() {
    let client = api("http://127.0.0.1:1");
    let error = client.health_check().await.unwrap_err();
    assert!(matches!(error, ClientError::Connection(_)));
}
