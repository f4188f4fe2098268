// ABOUTME: Composed client context wiring storage, API gateway, auth, settings, metrics and history
// ABOUTME: Entry point for host applications that drive the chat core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::api::ApiClient;
use crate::auth::{AuthSession, TokenStore};
use crate::chat::ChatSession;
use crate::config::ClientConfig;
use crate::history::ConversationHistory;
use crate::metrics::MetricsStore;
use crate::profile::UserStats;
use crate::settings::SettingsStore;
use crate::storage::{FileStore, MemoryStore, Persistence};
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{SavedConversation, View};
use std::sync::Arc;
use tracing::info;

/// Every long-lived component of the chat client
///
/// `durable` backs settings, theme, history, metrics and remembered tokens;
/// `ephemeral` backs tokens of sessions that should not be remembered.
#[derive(Debug, Clone)]
pub struct Dom360Client {
    api: Arc<ApiClient>,
    auth: Arc<AuthSession>,
    metrics: Arc<MetricsStore>,
    history: Arc<ConversationHistory>,
    settings: SettingsStore,
}

impl Dom360Client {
    /// Wire a client over explicit persistence media
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn with_persistence(
        config: ClientConfig,
        durable: &Persistence,
        ephemeral: Persistence,
    ) -> ClientResult<Self> {
        let tokens = TokenStore::new(durable.clone(), ephemeral);
        let api = Arc::new(ApiClient::new(config, tokens)?);
        Ok(Self {
            auth: Arc::new(AuthSession::new(Arc::clone(&api))),
            api,
            metrics: Arc::new(MetricsStore::new(durable.clone())),
            history: Arc::new(ConversationHistory::new(durable.clone())),
            settings: SettingsStore::new(durable.clone()),
        })
    }

    /// Wire a client with a file store under the configured data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        info!(data_dir = %config.data_dir.display(), api = %config.api_base_url, "Creating DOM360 client");
        let durable = Persistence::new(Arc::new(FileStore::new(config.data_dir.clone())));
        let ephemeral = Persistence::new(Arc::new(MemoryStore::new()));
        Self::with_persistence(config, &durable, ephemeral)
    }

    /// Wire a client from `DOM360_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns a validation error if a variable is malformed
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// API gateway
    #[must_use]
    pub const fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Auth session
    #[must_use]
    pub const fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    /// Usage aggregate
    #[must_use]
    pub const fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    /// Saved conversations
    #[must_use]
    pub const fn history(&self) -> &Arc<ConversationHistory> {
        &self.history
    }

    /// Settings and theme
    #[must_use]
    pub const fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Start a chat for the signed-in user with the stored settings
    ///
    /// The session's tenant and inbox also become the default routing of the
    /// API client, used by the conversation list and consumption dashboard.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationRequired` when nobody is signed in, or a
    /// validation error when routing cannot be resolved
    pub fn start_chat(&self) -> ClientResult<ChatSession> {
        let identity = self
            .auth
            .identity()
            .ok_or_else(|| ClientError::AuthenticationRequired("Please login first".to_owned()))?;
        let chat = ChatSession::for_identity(
            Arc::clone(&self.api),
            Arc::clone(&self.auth),
            Arc::clone(&self.metrics),
            &identity,
            &self.settings.load(),
        )?;
        chat.context().routing.apply_to(&self.api);
        Ok(chat)
    }

    /// Saved conversations visible to the signed-in user
    #[must_use]
    pub fn visible_history(&self) -> Vec<SavedConversation> {
        self.auth
            .identity()
            .map(|identity| self.history.visible_to(&identity))
            .unwrap_or_default()
    }

    /// Profile summary of the signed-in user
    #[must_use]
    pub fn user_stats(&self) -> Option<UserStats> {
        self.auth.is_authenticated().then(|| {
            UserStats::collect(
                &self.visible_history(),
                &self.metrics.snapshot(),
                &self.settings.load(),
            )
        })
    }

    /// Sidebar views for the signed-in user
    #[must_use]
    pub fn navigation(&self) -> Vec<View> {
        self.auth
            .identity()
            .map(|identity| identity.role.navigation())
            .unwrap_or_default()
    }

    /// View to show for a request, falling back to chat when not permitted
    #[must_use]
    pub fn resolve_view(&self, requested: View) -> View {
        self.auth
            .identity()
            .map_or(View::Chat, |identity| identity.role.resolve_view(requested))
    }
}
