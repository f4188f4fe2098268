// ABOUTME: Role-gated screen selection for the chat front-end
// ABOUTME: Exhaustive role/view access table, fallback resolution and sidebar ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use super::UserRole;
use serde::{Deserialize, Serialize};

/// Screens a host application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Active chat
    Chat,
    /// Local usage metrics
    Metrics,
    /// Saved conversations
    History,
    /// Chat settings
    Settings,
    /// User profile and stats
    Profile,
    /// Global user management
    Users,
    /// Tenant management
    Tenants,
    /// Inbox management
    Inboxes,
    /// Agent configuration
    AgentConfig,
    /// Cross-tenant metrics dashboard
    MasterMetrics,
    /// Users of the admin's own tenant
    TenantUsers,
    /// Inboxes of the admin's own tenant
    TenantInboxes,
}

impl View {
    /// Every view, in sidebar order
    pub const ALL: [Self; 12] = [
        Self::Chat,
        Self::History,
        Self::Metrics,
        Self::Settings,
        Self::Profile,
        Self::Users,
        Self::Tenants,
        Self::Inboxes,
        Self::AgentConfig,
        Self::MasterMetrics,
        Self::TenantUsers,
        Self::TenantInboxes,
    ];
}

impl UserRole {
    /// Whether a user with this role may open the view
    #[must_use]
    pub const fn can_access(&self, view: View) -> bool {
        match view {
            View::Chat | View::Metrics | View::History | View::Settings | View::Profile => true,
            View::Users
            | View::Tenants
            | View::Inboxes
            | View::AgentConfig
            | View::MasterMetrics => matches!(self, Self::Master),
            View::TenantUsers | View::TenantInboxes => {
                matches!(self, Self::Master | Self::TenantAdmin)
            }
        }
    }

    /// The view to render for a request, falling back to chat when not permitted
    #[must_use]
    pub const fn resolve_view(&self, requested: View) -> View {
        if self.can_access(requested) {
            requested
        } else {
            View::Chat
        }
    }

    /// Views available to this role, in sidebar order
    #[must_use]
    pub fn navigation(&self) -> Vec<View> {
        View::ALL
            .into_iter()
            .filter(|view| self.can_access(*view))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_sees_everything() {
        assert_eq!(UserRole::Master.navigation().len(), View::ALL.len());
    }

    #[test]
    fn test_tenant_admin_gets_tenant_screens_only() {
        let role = UserRole::TenantAdmin;
        assert!(role.can_access(View::TenantUsers));
        assert!(!role.can_access(View::Tenants));
        assert_eq!(role.resolve_view(View::MasterMetrics), View::Chat);
    }

    #[test]
    fn test_tenant_user_falls_back_to_chat() {
        let role = UserRole::TenantUser;
        assert_eq!(role.resolve_view(View::TenantInboxes), View::Chat);
        assert_eq!(role.resolve_view(View::History), View::History);
        assert_eq!(role.navigation().len(), 5);
    }
}
