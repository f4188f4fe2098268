// ABOUTME: Resolves the tenant and inbox a session talks to from the identity and settings
// ABOUTME: Only MASTER may override routing; tenant accounts must carry an assigned inbox
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::api::ApiClient;
use crate::settings::ChatSettings;
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{Identity, InboxId, TenantId, UserRole};
use tracing::debug;

/// Tenant and inbox a conversation is routed to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingContext {
    /// Tenant
    pub tenant_id: TenantId,
    /// Inbox
    pub inbox_id: InboxId,
}

impl RoutingContext {
    /// Create a routing context
    #[must_use]
    pub const fn new(tenant_id: TenantId, inbox_id: InboxId) -> Self {
        Self {
            tenant_id,
            inbox_id,
        }
    }

    /// Resolve routing for a signed-in identity
    ///
    /// MASTER uses the overrides in `settings`; tenant roles use their
    /// account's tenant and inbox and never fall back to a global default.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the required tenant or inbox is missing
    pub fn resolve(identity: &Identity, settings: &ChatSettings) -> ClientResult<Self> {
        let (tenant_id, inbox_id) = match identity.role {
            UserRole::Master => (
                settings.tenant_id.clone().ok_or_else(|| {
                    ClientError::validation("select a tenant in settings before chatting")
                })?,
                settings.inbox_id.clone().ok_or_else(|| {
                    ClientError::validation("select an inbox in settings before chatting")
                })?,
            ),
            UserRole::TenantAdmin | UserRole::TenantUser => (
                identity.tenant_id.clone().ok_or_else(|| {
                    ClientError::validation("account is not associated with a tenant")
                })?,
                identity.inbox_id.clone().ok_or_else(|| {
                    ClientError::validation(
                        "no inbox has been assigned to this account, contact an administrator",
                    )
                })?,
            ),
        };

        debug!(role = %identity.role, tenant_id = %tenant_id, inbox_id = %inbox_id, "Resolved routing");
        Ok(Self::new(tenant_id, inbox_id))
    }

    /// Make this the default routing of an API client
    pub fn apply_to(&self, api: &ApiClient) {
        api.set_routing(self.tenant_id.clone(), Some(self.inbox_id.clone()));
    }
}
