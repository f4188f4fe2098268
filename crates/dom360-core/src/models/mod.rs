// ABOUTME: Core data models for the DOM360 chat client
// ABOUTME: Re-exports messages, identities, agent personas, metrics, saved conversations and views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Data Models
//!
//! The models describe what the chat client holds in memory and what it
//! persists. Wire formats of the backend are decoded elsewhere and converted
//! into these types, so the rest of the client only sees one canonical shape.

// Identifier newtypes
mod ids;
pub use ids::{deserialize_optional_string_like, ConversationId, InboxId, MessageId, TenantId};

// Agent persona selector
mod agent;
pub use agent::AgentType;

// Conversation turns
pub mod message;
pub use message::{Message, MessageRole, RagSnippet, TokenUsage};

// Accounts and roles
mod user;
pub use user::{Identity, UserRole};

// Usage aggregation keyed by inbox and day
pub mod metrics;
pub use metrics::{DayMetrics, InboxMetrics, MetricsAggregate};

// Saved conversation snapshots for the history list
mod history;
pub use history::{derive_title, SavedConversation, SessionMetrics};

// Role-gated screens
mod view;
pub use view::View;
