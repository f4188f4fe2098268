// ABOUTME: Typed chat preferences with a single reducer-style update entry point
// ABOUTME: Persists settings and the theme preference through the persistence adapter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::storage::Persistence;
use dom360_core::constants::{defaults, storage_keys};
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{AgentType, InboxId, TenantId};
use dom360_core::phone;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Highest accepted sampling temperature
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Color scheme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark scheme
    #[default]
    Dark,
    /// Light scheme
    Light,
}

impl Theme {
    /// The other scheme
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// User preferences for the chat
///
/// Stored with camelCase keys so settings written by earlier clients load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSettings {
    /// UI animations
    pub animations: bool,
    /// Model requested from the backend
    pub ai_model: String,
    /// Sampling temperature in `[0, 2]`
    pub temperature: f32,
    /// Notification sounds
    pub sound_enabled: bool,
    /// Save conversations to history after each exchange
    pub auto_save: bool,
    /// UI and agent language
    pub language: String,
    /// Keep history on this device
    pub store_locally: bool,
    /// Tenant override (MASTER only)
    pub tenant_id: Option<TenantId>,
    /// Inbox override (MASTER only)
    pub inbox_id: Option<InboxId>,
    /// Active persona
    pub agent_type: AgentType,
    /// Lead phone in E.164
    pub phone: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            animations: true,
            ai_model: defaults::AI_MODEL.to_owned(),
            temperature: defaults::TEMPERATURE,
            sound_enabled: false,
            auto_save: true,
            language: defaults::LANGUAGE.to_owned(),
            store_locally: true,
            tenant_id: None,
            inbox_id: None,
            agent_type: AgentType::default(),
            phone: defaults::PHONE.to_owned(),
        }
    }
}

/// One change to [`ChatSettings`]
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    /// Toggle animations
    Animations(bool),
    /// Select a model
    AiModel(String),
    /// Set the temperature (clamped to `[0, 2]`)
    Temperature(f32),
    /// Toggle sounds
    SoundEnabled(bool),
    /// Toggle auto-save
    AutoSave(bool),
    /// Set the language tag
    Language(String),
    /// Toggle local history
    StoreLocally(bool),
    /// Set MASTER routing overrides
    Routing {
        /// Tenant override
        tenant_id: Option<TenantId>,
        /// Inbox override
        inbox_id: Option<InboxId>,
    },
    /// Select a persona
    AgentType(AgentType),
    /// Set the lead phone (normalized to E.164)
    Phone(String),
    /// Restore defaults
    Reset,
}

impl ChatSettings {
    /// Apply one update, returning the new settings
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank model or language, a non-finite
    /// temperature, or a phone that is not valid E.164 after normalization
    pub fn apply(&self, update: SettingsUpdate) -> ClientResult<Self> {
        let mut next = self.clone();
        match update {
            SettingsUpdate::Animations(on) => next.animations = on,
            SettingsUpdate::AiModel(model) => {
                next.ai_model = non_blank(&model, "model")?;
            }
            SettingsUpdate::Temperature(temperature) => {
                if !temperature.is_finite() {
                    return Err(ClientError::validation("temperature must be a number"));
                }
                next.temperature = temperature.clamp(0.0, MAX_TEMPERATURE);
            }
            SettingsUpdate::SoundEnabled(on) => next.sound_enabled = on,
            SettingsUpdate::AutoSave(on) => next.auto_save = on,
            SettingsUpdate::Language(language) => {
                next.language = non_blank(&language, "language")?;
            }
            SettingsUpdate::StoreLocally(on) => next.store_locally = on,
            SettingsUpdate::Routing {
                tenant_id,
                inbox_id,
            } => {
                next.tenant_id = tenant_id;
                next.inbox_id = inbox_id;
            }
            SettingsUpdate::AgentType(agent_type) => next.agent_type = agent_type,
            SettingsUpdate::Phone(raw) => {
                let normalized = phone::normalize_to_e164(&raw);
                if !phone::is_valid_e164(&normalized) {
                    return Err(ClientError::validation(format!("invalid phone number '{raw}'")));
                }
                next.phone = normalized;
            }
            SettingsUpdate::Reset => next = Self::default(),
        }
        Ok(next)
    }
}

fn non_blank(value: &str, field: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

/// Persisted settings and theme
#[derive(Debug, Clone)]
pub struct SettingsStore {
    persistence: Persistence,
}

impl SettingsStore {
    /// Create a store over the durable persistence adapter
    #[must_use]
    pub const fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }

    /// Stored settings, or defaults
    #[must_use]
    pub fn load(&self) -> ChatSettings {
        self.persistence.get(storage_keys::SETTINGS, ChatSettings::default())
    }

    /// Persist settings; returns whether the write succeeded
    pub fn save(&self, settings: &ChatSettings) -> bool {
        self.persistence.set(storage_keys::SETTINGS, settings)
    }

    /// Load, apply one update and persist
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`ChatSettings::apply`]; nothing is written then
    pub fn update(&self, update: SettingsUpdate) -> ClientResult<ChatSettings> {
        debug!(update = ?update, "Applying settings update");
        let next = self.load().apply(update)?;
        self.save(&next);
        Ok(next)
    }

    /// Stored theme, or dark
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.persistence.get(storage_keys::THEME, Theme::default())
    }

    /// Persist the theme
    pub fn set_theme(&self, theme: Theme) -> bool {
        self.persistence.set(storage_keys::THEME, &theme)
    }

    /// Switch between dark and light, returning the new theme
    pub fn toggle_theme(&self) -> Theme {
        let theme = self.theme().toggled();
        self.set_theme(theme);
        info!(theme = ?theme, "Theme changed");
        theme
    }
}
