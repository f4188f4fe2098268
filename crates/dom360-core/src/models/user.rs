// ABOUTME: Account identity and the closed set of user roles (MASTER, TENANT_ADMIN, TENANT_USER)
// ABOUTME: Role checks are exhaustive matches so adding a role is a compile-time change
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use super::{InboxId, TenantId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Global administrator across all tenants
    Master,
    /// Administrator of a single tenant
    TenantAdmin,
    /// Regular member of a tenant
    TenantUser,
}

impl UserRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "MASTER",
            Self::TenantAdmin => "TENANT_ADMIN",
            Self::TenantUser => "TENANT_USER",
        }
    }

    /// Whether this role may override tenant and inbox routing locally
    #[must_use]
    pub const fn can_override_routing(&self) -> bool {
        match self {
            Self::Master => true,
            Self::TenantAdmin | Self::TenantUser => false,
        }
    }

    /// Whether this role sees every tenant's data
    #[must_use]
    pub const fn is_global(&self) -> bool {
        match self {
            Self::Master => true,
            Self::TenantAdmin | Self::TenantUser => false,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current authenticated user as known to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account id
    pub user_id: String,
    /// Tenant the account belongs to (absent for MASTER accounts)
    pub tenant_id: Option<TenantId>,
    /// Account role
    pub role: UserRole,
    /// Login name
    pub username: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Inbox assigned to the account by a MASTER
    pub inbox_id: Option<InboxId>,
}

impl Identity {
    /// Whether the identity holds any of the given roles
    #[must_use]
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }

    /// Name to show in the chat, falling back to the username
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .filter(|n| !n.trim().is_empty())
    }
}
