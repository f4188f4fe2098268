// ABOUTME: Ephemeral in-process key/value store, the session-scoped storage medium
// ABOUTME: Optional byte quota reproduces quota-exceeded write failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use super::KeyValueStore;
use dashmap::DashMap;
use dom360_core::errors::StorageError;

/// In-memory store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes past `quota_bytes` of stored values
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key() != key)
            .map(|entry| entry.value().len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let available = quota.saturating_sub(self.used_bytes_excluding(key));
            if value.len() > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    required: value.len(),
                    available,
                });
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
