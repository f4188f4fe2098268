// ABOUTME: Key/value persistence adapter with JSON encoding and fallback-to-default reads
// ABOUTME: KeyValueStore trait abstracts the medium; memory and file implementations live alongside
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Persistence
//!
//! Client state that outlives a session (settings, theme, saved conversations,
//! the metrics aggregate, the bearer token) goes through [`Persistence`].
//! Reads never fail: a missing or corrupt value yields the caller's default.
//! Writes never partially apply: the value is encoded before the store is
//! touched and the stores replace values atomically.
//!
//! Several processes sharing one durable directory race on the same keys with
//! last-write-wins semantics; nothing here coordinates them.

/// Durable file-backed store
pub mod file;
/// Ephemeral in-process store
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use dom360_core::errors::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Synchronous string-keyed storage medium
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the write is refused; the previous value is kept
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON persistence adapter over a [`KeyValueStore`]
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Wrap a store
    #[must_use]
    pub const fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Adapter over a fresh in-memory store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read and decode `key`, surfacing failures
    ///
    /// # Errors
    ///
    /// Returns an error if the medium fails or the stored JSON does not decode
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get_raw(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialization {
                key: key.to_owned(),
                source,
            })
    }

    /// Read and decode `key`, returning `default` when missing or unreadable
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "Stored value unreadable, using default");
                default
            }
        }
    }

    /// Encode and store `value`; failures are logged and the previous value is kept
    ///
    /// Returns whether the write succeeded.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode value for storage");
                return false;
            }
        };
        match self.store.set_raw(key, &encoded) {
            Ok(()) => {
                debug!(key, bytes = encoded.len(), "Stored value");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to store value, keeping previous");
                false
            }
        }
    }

    /// Delete `key`; failures are logged
    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Failed to remove stored value");
                false
            }
        }
    }
}
