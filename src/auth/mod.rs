// ABOUTME: Auth session manager: token restore, login, logout and role predicates
// ABOUTME: Any authentication-required error tears the session down
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Authentication
//!
//! [`AuthSession`] holds the identity of the signed-in user. The bearer token
//! itself lives in the [`TokenStore`], which the API client reads on every
//! request, so tearing the session down here immediately stops
//! authenticated traffic. The store keeps the token in memory as well, so a
//! login whose token cannot be persisted still authenticates its requests.

/// Token storage and claim decoding
pub mod token;

pub use token::{decode_claims, decode_unexpired_claims, TokenClaims, TokenStore};

use crate::api::ApiClient;
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{Identity, UserRole};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Signed-in state
#[derive(Clone)]
struct SignedIn {
    token: String,
    identity: Identity,
}

impl fmt::Debug for SignedIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedIn")
            .field("token", &"[redacted]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Current authentication state of the client
#[derive(Debug)]
pub struct AuthSession {
    api: Arc<ApiClient>,
    state: RwLock<Option<SignedIn>>,
}

impl AuthSession {
    /// Create an unauthenticated session
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(None),
        }
    }

    fn tokens(&self) -> &TokenStore {
        self.api.tokens()
    }

    fn replace_state(&self, next: Option<SignedIn>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn read_state(&self) -> Option<SignedIn> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Restore the session from a stored token
    ///
    /// An expired or undecodable token is cleared and the session stays
    /// unauthenticated.
    pub fn restore(&self) -> Option<Identity> {
        let token = self.tokens().token()?;
        match decode_unexpired_claims(&token) {
            Ok(claims) => {
                let identity = claims.identity();
                info!(user_id = %identity.user_id, role = %identity.role, "Session restored");
                self.replace_state(Some(SignedIn {
                    token,
                    identity: identity.clone(),
                }));
                Some(identity)
            }
            Err(e) if e.requires_login() => {
                info!("Stored token expired, clearing session");
                self.logout();
                None
            }
            Err(e) => {
                warn!(error = %e, "Stored token unreadable, clearing session");
                self.logout();
                None
            }
        }
    }

    /// Log in with email and password
    ///
    /// `remember` keeps the token in the durable medium; otherwise it lives in
    /// the ephemeral one.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank credentials, otherwise the mapped
    /// request error of the login call
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> ClientResult<Identity> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("email and password are required"));
        }

        let response = self.api.login(email, password).await?;
        let mut identity = Identity::from(response.user);
        if identity.inbox_id.is_none() {
            identity.inbox_id = decode_claims(&response.access_token)
                .ok()
                .and_then(|claims| claims.inbox_id);
        }

        if !self.tokens().save(&response.access_token, remember) {
            warn!("Token could not be persisted, session will not survive a restart");
        }
        info!(user_id = %identity.user_id, role = %identity.role, remember, "Logged in");
        self.replace_state(Some(SignedIn {
            token: response.access_token,
            identity: identity.clone(),
        }));
        Ok(identity)
    }

    /// Clear the token from both media and drop the identity
    pub fn logout(&self) {
        self.tokens().clear();
        self.api.clear_routing();
        if self.read_state().is_some() {
            info!("Logged out");
        }
        self.replace_state(None);
    }

    /// Tear the session down if `error` demands re-authentication
    ///
    /// Returns whether the session was torn down.
    pub fn handle_error(&self, error: &ClientError) -> bool {
        if error.requires_login() {
            warn!(error = %error, "Backend rejected credentials, logging out");
            self.logout();
            true
        } else {
            false
        }
    }

    /// Signed-in identity
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.read_state().map(|state| state.identity)
    }

    /// Bearer token of the signed-in user
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read_state().map(|state| state.token)
    }

    /// Whether a user is signed in
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_some()
    }

    /// Whether the signed-in user holds any of `roles`
    #[must_use]
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        self.read_state()
            .is_some_and(|state| state.identity.has_role(roles))
    }

    /// Global administrator
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.has_role(&[UserRole::Master])
    }

    /// Tenant administrator, or MASTER
    #[must_use]
    pub fn is_tenant_admin(&self) -> bool {
        self.has_role(&[UserRole::Master, UserRole::TenantAdmin])
    }

    /// Regular tenant member
    #[must_use]
    pub fn is_tenant_user(&self) -> bool {
        self.has_role(&[UserRole::TenantUser])
    }
}
