// ABOUTME: Integration tests for the auth session manager
// ABOUTME: Covers login with remember-me, token restore, expiry, logout and role predicates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use dom360_chat::auth::TokenStore;
use dom360_chat::chat::SendOutcome;
use dom360_chat::client::Dom360Client;
use dom360_chat::config::ClientConfig;
use dom360_chat::errors::ClientError;
use dom360_chat::models::{InboxId, TenantId, UserRole, View};
use dom360_chat::storage::{MemoryStore, Persistence};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_body(token: &str, role: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "user": {"id": 5, "tenant_id": 1, "role": role, "username": "ana", "email": "ana@dom360.com", "name": "Ana"}
    })
}

#[tokio::test]
async fn test_login_with_remember_uses_durable_medium() {
    let server = MockServer::start().await;
    let token = common::tenant_user_token();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ana@dom360.com", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&token, "TENANT_USER")))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri());
    let identity = client
        .auth()
        .login(" ana@dom360.com ", "s3cret", true)
        .await
        .unwrap();

    assert_eq!(identity.user_id, "5");
    assert_eq!(identity.tenant_id, Some(TenantId::new("1")));
    assert_eq!(identity.inbox_id, Some(InboxId::new("27")));
    assert_eq!(client.auth().token(), Some(token.clone()));
    assert!(client.api().tokens().is_remembered());
    assert!(client.auth().is_tenant_user());
    assert!(!client.auth().is_tenant_admin());
    assert!(!client.auth().is_master());
    assert!(client.auth().has_role(&[UserRole::TenantUser, UserRole::Master]));
}

#[tokio::test]
async fn test_login_without_remember_is_not_durable() {
    let server = MockServer::start().await;
    let token = common::master_token();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&token, "MASTER")))
        .mount(&server)
        .await;

    let durable = Persistence::in_memory();
    let client = dom360_chat::client::Dom360Client::with_persistence(
        dom360_chat::config::ClientConfig::for_url(server.uri()),
        &durable,
        Persistence::in_memory(),
    )
    .unwrap();

    client.auth().login("root@dom360.com", "pw", false).await.unwrap();
    assert!(client.auth().is_master());
    assert!(client.auth().is_tenant_admin());
    assert!(!client.api().tokens().is_remembered());

    // A later run only sees the durable medium
    let next_run = TokenStore::new(durable, Persistence::in_memory());
    assert!(next_run.token().is_none());
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri());
    let error = client.auth().login("ana@dom360.com", "wrong", true).await.unwrap_err();
    assert_eq!(error, ClientError::AuthenticationRequired("Invalid credentials".into()));
    assert!(!client.auth().is_authenticated());
    assert!(client.api().tokens().token().is_none());

    let error = client.auth().login("  ", "pw", true).await.unwrap_err();
    assert!(matches!(error, ClientError::Validation(_)));
}

#[test]
fn test_restore_valid_expired_and_garbage_tokens() {
    let client = common::client("http://localhost:3001");
    assert!(client.auth().restore().is_none());

    client.api().tokens().save(&common::tenant_user_token(), false);
    let identity = client.auth().restore().unwrap();
    assert_eq!(identity.role, UserRole::TenantUser);
    assert_eq!(identity.display_name(), Some("Ana"));

    let expired = common::jwt(&json!({"sub": "1", "role": "TENANT_USER", "exp": 1_600_000_000}));
    client.api().tokens().save(&expired, true);
    assert!(client.auth().restore().is_none());
    assert!(!client.auth().is_authenticated());
    assert!(client.api().tokens().token().is_none());

    client.api().tokens().save("garbage", true);
    assert!(client.auth().restore().is_none());
    assert!(client.api().tokens().token().is_none());
}

#[test]
fn test_logout_clears_everything() {
    let client = common::signed_in_client("http://localhost:3001", &common::tenant_user_token());
    let chat = client.start_chat().unwrap();
    assert_eq!(client.api().routing().inbox_id, Some(InboxId::new("27")));
    assert_eq!(chat.context().routing.tenant_id.as_str(), "1");

    client.auth().logout();
    assert!(!client.auth().is_authenticated());
    assert!(client.api().tokens().token().is_none());
    assert!(client.api().routing().tenant_id.is_none());
    assert!(client.navigation().is_empty());
    assert_eq!(client.resolve_view(View::Tenants), View::Chat);
    assert!(matches!(
        client.start_chat(),
        Err(ClientError::AuthenticationRequired(_))
    ));
}

#[tokio::test]
async fn test_login_survives_token_storage_failure() {
    let server = MockServer::start().await;
    let token = common::tenant_user_token();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&token, "TENANT_USER")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::chat_response(42, 120, 350)))
        .expect(1)
        .mount(&server)
        .await;

    common::init_test_logging();
    let full = || Persistence::new(Arc::new(MemoryStore::with_quota(0)));
    let client =
        Dom360Client::with_persistence(ClientConfig::for_url(&server.uri()), &full(), full())
            .unwrap();

    client.auth().login("ana@dom360.com", "s3cret", true).await.unwrap();
    assert!(client.auth().is_authenticated());
    assert!(!client.api().tokens().is_remembered());
    assert_eq!(client.api().tokens().token(), Some(token));

    let chat = client.start_chat().unwrap();
    let outcome = chat.send_message("Olá", None).await.unwrap();
    assert!(matches!(outcome, SendOutcome::Delivered(_)));
    assert!(client.auth().is_authenticated());

    client.auth().logout();
    assert!(client.api().tokens().token().is_none());
}
