// ABOUTME: Profile summary combining saved history, the usage aggregate and current settings
// ABOUTME: Produces the figures shown on the user's profile screen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::settings::ChatSettings;
use dom360_core::models::{AgentType, MetricsAggregate, SavedConversation};
use serde::Serialize;

/// Label used when no phone is configured
pub const PHONE_NOT_CONFIGURED: &str = "Não configurado";

/// Usage summary for the profile screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Saved conversations visible to the user
    pub total_conversations: usize,
    /// Exchanges recorded in the aggregate
    pub total_messages: u64,
    /// Tokens consumed
    pub total_tokens: u64,
    /// Summed reply latency
    pub total_latency_ms: u64,
    /// Summed latency as `HH:MM:SS`
    pub time_spent: String,
    /// Average latency per exchange
    pub average_latency_ms: u64,
    /// Configured model
    pub favorite_model: String,
    /// Configured phone, or a placeholder
    pub current_phone: String,
    /// Configured persona
    pub agent_type: AgentType,
}

impl UserStats {
    /// Build the summary
    #[must_use]
    pub fn collect(
        conversations: &[SavedConversation],
        metrics: &MetricsAggregate,
        settings: &ChatSettings,
    ) -> Self {
        let phone = settings.phone.trim();
        Self {
            total_conversations: conversations.len(),
            total_messages: metrics.message_count,
            total_tokens: metrics.total_tokens,
            total_latency_ms: metrics.total_latency_ms,
            time_spent: format_duration_ms(metrics.total_latency_ms),
            average_latency_ms: metrics.average_latency_ms(),
            favorite_model: settings.ai_model.clone(),
            current_phone: if phone.is_empty() {
                PHONE_NOT_CONFIGURED.to_owned()
            } else {
                phone.to_owned()
            },
            agent_type: settings.agent_type,
        }
    }
}

/// `HH:MM:SS` for a millisecond span; hours wrap at 24
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    let seconds = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        (seconds / 3600) % 24,
        (seconds / 60) % 60,
        seconds % 60
    )
}
