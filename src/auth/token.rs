// ABOUTME: Bearer token storage (durable or ephemeral per remember-me) and client-side claim decoding
// ABOUTME: Claims are decoded with jsonwebtoken without a signature check; the backend verifies signatures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::storage::Persistence;
use chrono::{DateTime, Utc};
use dom360_core::constants::storage_keys;
use dom360_core::errors::{ClientError, ClientResult};
use dom360_core::models::{deserialize_optional_string_like, Identity, InboxId, TenantId, UserRole};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Where the bearer token lives between runs
///
/// The token of the running session is also held in memory, so a storage
/// failure costs persistence across restarts but never the session itself.
/// Clones share that in-memory copy.
#[derive(Clone)]
pub struct TokenStore {
    durable: Persistence,
    ephemeral: Persistence,
    current: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("durable", &self.durable)
            .field("ephemeral", &self.ephemeral)
            .field("current", &"[redacted]")
            .finish()
    }
}

impl TokenStore {
    /// Create a token store over a durable and an ephemeral medium
    #[must_use]
    pub fn new(durable: Persistence, ephemeral: Persistence) -> Self {
        Self {
            durable,
            ephemeral,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Token store where both media are in memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Persistence::in_memory(), Persistence::in_memory())
    }

    fn set_current(&self, token: Option<String>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Current token: the in-memory copy, then the durable medium, then the ephemeral one
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let current = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        current
            .or_else(|| {
                [&self.durable, &self.ephemeral]
                    .into_iter()
                    .find_map(|medium| medium.get::<Option<String>>(storage_keys::AUTH_TOKEN, None))
            })
            .filter(|token| !token.is_empty())
    }

    /// Whether the current token came from the durable medium
    #[must_use]
    pub fn is_remembered(&self) -> bool {
        self.durable
            .get::<Option<String>>(storage_keys::AUTH_TOKEN, None)
            .is_some_and(|token| !token.is_empty())
    }

    /// Store a token; `remember` selects the durable medium
    ///
    /// The other medium is cleared so one token is visible at a time. The
    /// token is usable through [`Self::token`] even when the write fails.
    /// Returns whether the write succeeded.
    pub fn save(&self, token: &str, remember: bool) -> bool {
        let (target, other) = if remember {
            (&self.durable, &self.ephemeral)
        } else {
            (&self.ephemeral, &self.durable)
        };
        self.set_current(Some(token.to_owned()));
        other.remove(storage_keys::AUTH_TOKEN);
        let stored = target.set(storage_keys::AUTH_TOKEN, token);
        if stored {
            debug!(remember, "Stored bearer token");
        } else {
            warn!(remember, "Bearer token kept in memory only");
        }
        stored
    }

    /// Remove the token from memory and both media
    pub fn clear(&self) {
        self.set_current(None);
        self.durable.remove(storage_keys::AUTH_TOKEN);
        self.ephemeral.remove(storage_keys::AUTH_TOKEN);
    }
}

/// Claims carried in the payload of a DOM360 access token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Account id
    #[serde(default, deserialize_with = "deserialize_optional_string_like")]
    pub sub: Option<String>,
    /// Tenant of the account
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// Account role
    pub role: UserRole,
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Assigned inbox
    #[serde(default)]
    pub inbox_id: Option<InboxId>,
    /// Expiry as seconds since the epoch
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Expiry instant, if the token has one
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token is expired at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }

    /// Identity described by the claims
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub.clone().unwrap_or_default(),
            tenant_id: self.tenant_id.clone(),
            role: self.role,
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            inbox_id: self.inbox_id.clone(),
        }
    }
}

/// Validation that reads claims without checking the signature
///
/// The backend owns the signing key and verifies every request.
fn claims_validation(check_expiry: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_aud = false;
    validation.validate_exp = check_expiry;
    validation.leeway = 0;
    validation
}

fn decode_with(token: &str, validation: &Validation) -> ClientResult<TokenClaims> {
    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                ClientError::AuthenticationRequired("session expired, please login again".into())
            }
            _ => ClientError::validation(format!("token is not a readable JWT: {e}")),
        })
}

/// Decode the claims of a JWT without verifying its signature or expiry
///
/// # Errors
///
/// Returns a validation error if the token is malformed or its claims lack a
/// known role
pub fn decode_claims(token: &str) -> ClientResult<TokenClaims> {
    decode_with(token, &claims_validation(false))
}

/// Decode the claims of a JWT that has not expired yet
///
/// # Errors
///
/// Returns an authentication error when the token has expired, otherwise the
/// errors of [`decode_claims`]
pub fn decode_unexpired_claims(token: &str) -> ClientResult<TokenClaims> {
    decode_with(token, &claims_validation(true))
}
