// ABOUTME: HTTP gateway to the DOM360 backend with bearer auth and tenant/inbox routing headers
// ABOUTME: Maps 401/403/other statuses and transport failures onto the client error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # API Gateway Client
//!
//! [`ApiClient`] is the single entry point for backend calls. Every request
//! reads the bearer token from the [`TokenStore`] at send time, so a login or
//! logout elsewhere takes effect on the next call without rebuilding the
//! client.
//!
//! Routing headers come from one of two places. The `*_routed` operations take
//! the tenant and inbox of the caller, which is how chat sessions talk to the
//! backend, so several sessions can share one client. The other operations use
//! the client-wide default set through [`ApiClient::set_routing`].

/// History payload normalization
pub mod normalize;
/// Request and response bodies
pub mod wire;

use crate::auth::TokenStore;
use crate::config::ClientConfig;
use crate::routing::RoutingContext;
use chrono::{SecondsFormat, Utc};
use dom360_core::constants::{api_paths, defaults, headers};
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{AgentType, ConversationId, InboxId, Message, TenantId};
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

pub use wire::{ChatExchange, ChatRequest, ChatResponse, HealthStatus, LoginResponse};

/// Tenant and inbox the client is currently routed to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingHeaders {
    /// Value of `X-Tenant-ID`
    pub tenant_id: Option<TenantId>,
    /// Value of `X-Inbox-ID`
    pub inbox_id: Option<InboxId>,
}

impl From<&RoutingContext> for RoutingHeaders {
    fn from(routing: &RoutingContext) -> Self {
        Self {
            tenant_id: Some(routing.tenant_id.clone()),
            inbox_id: Some(routing.inbox_id.clone()),
        }
    }
}

/// Parameters of one chat send
#[derive(Debug, Clone, Copy)]
pub struct SendChat<'a> {
    /// User text
    pub message: &'a str,
    /// Conversation to continue
    pub conversation_id: Option<&'a ConversationId>,
    /// Persona
    pub agent_type: AgentType,
    /// Lead phone
    pub user_phone: &'a str,
    /// Display name
    pub user_name: &'a str,
}

/// Authenticated client for the DOM360 REST backend
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    tokens: TokenStore,
    routing: RwLock<RoutingHeaders>,
}

impl ApiClient {
    /// Build a client with the configured timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built
    pub fn new(config: ClientConfig, tokens: TokenStore) -> ClientResult<Self> {
        config.validate()?;
        let http = ClientBuilder::new()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            tokens,
            routing: RwLock::new(RoutingHeaders::default()),
        })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token store consulted for the bearer token
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Default routing for operations that do not take their own
    pub fn set_routing(&self, tenant_id: TenantId, inbox_id: Option<InboxId>) {
        debug!(tenant_id = %tenant_id, inbox_id = ?inbox_id.as_ref().map(InboxId::as_str), "Routing context set");
        *self.routing.write().unwrap_or_else(PoisonError::into_inner) = RoutingHeaders {
            tenant_id: Some(tenant_id),
            inbox_id,
        };
    }

    /// Drop the default routing
    pub fn clear_routing(&self) {
        *self.routing.write().unwrap_or_else(PoisonError::into_inner) = RoutingHeaders::default();
    }

    /// Default routing headers
    #[must_use]
    pub fn routing(&self) -> RoutingHeaders {
        self.routing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `GET /api/health`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy
    pub async fn health_check(&self) -> ClientResult<HealthStatus> {
        Self::execute(
            self.request(Method::GET, api_paths::HEALTH, &self.routing()),
            api_paths::HEALTH,
        )
        .await
    }

    /// `POST /api/auth/login`
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the call fails
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = wire::LoginRequest { email, password };
        debug!(body = %redacted_body(&body), "Logging in");
        Self::execute(
            self.request(Method::POST, api_paths::LOGIN, &RoutingHeaders::default())
                .json(&body),
            api_paths::LOGIN,
        )
        .await
    }

    /// `POST /api/chat` with the default routing
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call when tenant or inbox
    /// routing is missing, otherwise the mapped request error
    pub async fn send_chat(&self, send: SendChat<'_>) -> ClientResult<ChatExchange> {
        self.send_chat_with(&self.routing(), send).await
    }

    /// `POST /api/chat` routed to `routing`, ignoring the default
    ///
    /// # Errors
    ///
    /// Returns the mapped request error
    pub async fn send_chat_routed(
        &self,
        routing: &RoutingContext,
        send: SendChat<'_>,
    ) -> ClientResult<ChatExchange> {
        self.send_chat_with(&RoutingHeaders::from(routing), send)
            .await
    }

    async fn send_chat_with(
        &self,
        routing: &RoutingHeaders,
        send: SendChat<'_>,
    ) -> ClientResult<ChatExchange> {
        require_routing(routing, true)?;
        let body = ChatRequest {
            message: send.message,
            conversation_id: send.conversation_id,
            agent_type: send.agent_type,
            user_phone: send.user_phone,
            user_name: send.user_name,
        };
        let response: ChatResponse = Self::execute(
            self.request(Method::POST, api_paths::CHAT, routing)
                .json(&body),
            api_paths::CHAT,
        )
        .await?;
        Ok(response.into_exchange(&now_iso()))
    }

    /// `GET /api/conversations/{id}/messages` with the default routing, normalized
    ///
    /// # Errors
    ///
    /// Returns a validation error when tenant routing is missing, a request
    /// error when the payload envelope is unrecognized, otherwise the mapped
    /// request error
    pub async fn conversation_messages(&self, id: &ConversationId) -> ClientResult<Vec<Message>> {
        self.conversation_messages_with(&self.routing(), id).await
    }

    /// `GET /api/conversations/{id}/messages` routed to `routing`, normalized
    ///
    /// # Errors
    ///
    /// Returns a request error when the payload envelope is unrecognized,
    /// otherwise the mapped request error
    pub async fn conversation_messages_routed(
        &self,
        routing: &RoutingContext,
        id: &ConversationId,
    ) -> ClientResult<Vec<Message>> {
        self.conversation_messages_with(&RoutingHeaders::from(routing), id)
            .await
    }

    async fn conversation_messages_with(
        &self,
        routing: &RoutingHeaders,
        id: &ConversationId,
    ) -> ClientResult<Vec<Message>> {
        require_routing(routing, false)?;
        let path = format!("{}/{id}/messages", api_paths::CONVERSATIONS);
        let payload: Value =
            Self::execute(self.request(Method::GET, &path, routing), &path).await?;
        normalize::normalize_messages(&payload, &now_iso()).ok_or_else(|| {
            warn!(conversation_id = %id, "Unrecognized conversation payload");
            ClientError::request_failed(
                StatusCode::OK.as_u16(),
                "unrecognized conversation messages payload",
            )
        })
    }

    /// `GET /api/conversations?limit=N`
    ///
    /// # Errors
    ///
    /// Returns a validation error when routing is missing, otherwise the mapped request error
    pub async fn list_conversations(&self, limit: Option<u32>) -> ClientResult<Value> {
        let routing = self.routing();
        require_routing(&routing, true)?;
        let limit = limit.unwrap_or(defaults::CONVERSATION_LIST_LIMIT);
        let path = format!("{}?limit={limit}", api_paths::CONVERSATIONS);
        Self::execute(self.request(Method::GET, &path, &routing), &path).await
    }

    /// `GET /api/dashboard/consumption?days=N`
    ///
    /// # Errors
    ///
    /// Returns a validation error when routing is missing, otherwise the mapped request error
    pub async fn consumption_dashboard(&self, days: Option<u32>) -> ClientResult<Value> {
        let routing = self.routing();
        require_routing(&routing, true)?;
        let days = days.unwrap_or(defaults::DASHBOARD_DAYS);
        let path = format!("{}?days={days}", api_paths::CONSUMPTION_DASHBOARD);
        Self::execute(self.request(Method::GET, &path, &routing), &path).await
    }

    fn request(&self, method: Method, path: &str, routing: &RoutingHeaders) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.config.url(path))
            .header(ACCEPT, "application/json");

        if let Some(token) = self.tokens.token() {
            builder = builder.bearer_auth(token);
        } else if path != api_paths::HEALTH && path != api_paths::LOGIN {
            debug!(path, "No bearer token available, request may be rejected");
        }

        if let Some(tenant_id) = &routing.tenant_id {
            builder = builder.header(headers::TENANT_ID, tenant_id.as_str());
        }
        if let Some(inbox_id) = &routing.inbox_id {
            builder = builder.header(headers::INBOX_ID, inbox_id.as_str());
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(builder: RequestBuilder, path: &str) -> ClientResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(path, &e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(path, &e))?;

        if !status.is_success() {
            let error = status_error(status, &body);
            warn!(path, status = status.as_u16(), error = %error, "Backend request failed");
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(path, error = %e, "Backend response did not match the expected shape");
            ClientError::request_failed(status.as_u16(), format!("invalid response body: {e}"))
        })
    }
}

fn require_routing(routing: &RoutingHeaders, needs_inbox: bool) -> ClientResult<()> {
    if routing.tenant_id.is_none() || (needs_inbox && routing.inbox_id.is_none()) {
        return Err(ClientError::validation(
            "API not initialized: tenant and inbox routing must be set first",
        ));
    }
    Ok(())
}

/// Serialize any body as JSON for logging without secrets
#[must_use]
pub fn redacted_body<T: Serialize>(body: &T) -> String {
    serde_json::to_value(body)
        .map(|mut value| {
            if let Some(fields) = value.as_object_mut() {
                for key in ["password", "access_token"] {
                    if fields.contains_key(key) {
                        fields.insert(key.to_owned(), Value::String("[redacted]".to_owned()));
                    }
                }
            }
            value.to_string()
        })
        .unwrap_or_default()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn transport_error(path: &str, error: &reqwest::Error) -> ClientError {
    warn!(path, error = %error, "Backend unreachable");
    if error.is_timeout() {
        ClientError::connection(format!("request to {path} timed out"))
    } else {
        ClientError::connection(format!("request to {path} failed: {error}"))
    }
}

/// Server-provided error text: `detail`, `error` or `message`
fn payload_message(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(str::to_owned)
}

/// Map a non-2xx response onto the error taxonomy
#[must_use]
pub fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = payload_message(body);
    match status {
        StatusCode::UNAUTHORIZED => ClientError::AuthenticationRequired(
            message.unwrap_or_else(|| "Please login again".to_owned()),
        ),
        StatusCode::FORBIDDEN => ClientError::AccessDenied(
            message.unwrap_or_else(|| "Insufficient permissions".to_owned()),
        ),
        _ => ClientError::request_failed(
            status.as_u16(),
            message.unwrap_or_else(|| status_line(status)),
        ),
    }
}

fn status_line(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(
        || format!("HTTP {}", status.as_u16()),
        |reason| format!("HTTP {} {reason}", status.as_u16()),
    )
}
