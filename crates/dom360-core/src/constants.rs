// ABOUTME: Application constants for storage keys, HTTP headers, API paths and defaults
// ABOUTME: Single source for names shared between the persistence, gateway and session layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

/// Keys under which client state is persisted
pub mod storage_keys {
    /// Theme preference (`dark` / `light`)
    pub const THEME: &str = "chat-theme";
    /// Chat settings object
    pub const SETTINGS: &str = "chat-settings";
    /// Saved conversation list
    pub const CONVERSATIONS: &str = "chat-conversations";
    /// Global metrics aggregate
    pub const METRICS: &str = "sdr_global_metrics";
    /// Bearer token, in the durable or the ephemeral store
    pub const AUTH_TOKEN: &str = "dom360_auth_token";
}

/// HTTP header names
pub mod headers {
    /// Tenant routing header
    pub const TENANT_ID: &str = "X-Tenant-ID";
    /// Inbox routing header
    pub const INBOX_ID: &str = "X-Inbox-ID";
}

/// Backend REST paths
pub mod api_paths {
    /// Health check
    pub const HEALTH: &str = "/api/health";
    /// Login
    pub const LOGIN: &str = "/api/auth/login";
    /// Send a chat message
    pub const CHAT: &str = "/api/chat";
    /// Conversation collection
    pub const CONVERSATIONS: &str = "/api/conversations";
    /// Consumption dashboard
    pub const CONSUMPTION_DASHBOARD: &str = "/api/dashboard/consumption";
}

/// Default values
pub mod defaults {
    /// Backend base URL when none is configured
    pub const API_BASE_URL: &str = "http://localhost:3001";
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Conversation list page size
    pub const CONVERSATION_LIST_LIMIT: u32 = 50;
    /// Consumption dashboard window in days
    pub const DASHBOARD_DAYS: u32 = 30;
    /// Model shown in settings before the user picks one
    pub const AI_MODEL: &str = "amazon.nova-lite-v1:0";
    /// Sampling temperature
    pub const TEMPERATURE: f32 = 0.2;
    /// Interface language
    pub const LANGUAGE: &str = "pt-BR";
    /// Phone used when the user has not configured one
    pub const PHONE: &str = "+5511999999999";
    /// Display name used when the account has none
    pub const USER_NAME: &str = "Usuário";
    /// Title for conversations without a usable user message
    pub const CONVERSATION_TITLE: &str = "Nova conversa";
    /// Maximum title length before truncation
    pub const TITLE_MAX_CHARS: usize = 50;
    /// Prefix for locally generated message ids
    pub const TEMP_ID_PREFIX: &str = "temp_";
}
