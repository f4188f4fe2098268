// ABOUTME: Main library entry point for the DOM360 chat client core
// ABOUTME: Chat sessions, auth, routing, settings, usage metrics and history over the DOM360 REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

#![deny(unsafe_code)]

//! # DOM360 Chat
//!
//! Client core for the DOM360 SDR/Copilot assistant. Host applications (a
//! desktop shell, a terminal UI, a test harness) drive it; nothing in here
//! renders anything.
//!
//! ## Architecture
//!
//! - **Storage**: `KeyValueStore` media (file, memory) behind the `Persistence` adapter
//! - **API**: `ApiClient`, the authenticated gateway to the backend
//! - **Auth**: `AuthSession` and the remember-me aware `TokenStore`
//! - **Routing/Settings**: typed preferences and tenant/inbox resolution
//! - **Chat**: `ChatSession`, the single-flight send state machine
//! - **Metrics/History**: persisted usage aggregate and saved conversations
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dom360_chat::client::Dom360Client;
//! use dom360_chat::errors::ClientResult;
//!
//! #[tokio::main]
//! async fn main() -> ClientResult<()> {
//!     let client = Dom360Client::from_env()?;
//!     if client.auth().restore().is_none() {
//!         client.auth().login("ana@dom360.com", "secret", true).await?;
//!     }
//!
//!     let chat = client.start_chat()?;
//!     chat.send_message("Olá", Some("Ana")).await?;
//!     chat.autosave(client.history(), &client.settings().load()).await;
//!     Ok(())
//! }
//! ```

/// HTTP gateway to the backend
pub mod api;

/// Authentication session and token storage
pub mod auth;

/// Chat session core
pub mod chat;

/// Composed client context
pub mod client;

/// Environment configuration
pub mod config;

/// Saved conversation history
pub mod history;

/// Logging setup
pub mod logging;

/// Persisted usage metrics
pub mod metrics;

/// Profile summary
pub mod profile;

/// Tenant and inbox routing
pub mod routing;

/// Typed chat preferences
pub mod settings;

/// Key/value persistence
pub mod storage;

pub use dom360_core::{constants, errors, models, phone};
