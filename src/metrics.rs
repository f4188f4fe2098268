// ABOUTME: Persisted usage aggregate updated once per successful exchange
// ABOUTME: Applies the pure reducer and writes the result under a single lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::storage::Persistence;
use chrono::{DateTime, Utc};
use dom360_core::constants::storage_keys;
use dom360_core::models::{InboxId, MetricsAggregate, TokenUsage};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Process-wide metrics aggregate backed by the persistence adapter
#[derive(Debug)]
pub struct MetricsStore {
    persistence: Persistence,
    current: Mutex<MetricsAggregate>,
}

impl MetricsStore {
    /// Load the stored aggregate, or start empty
    #[must_use]
    pub fn new(persistence: Persistence) -> Self {
        let current = persistence.get(storage_keys::METRICS, MetricsAggregate::default());
        Self {
            persistence,
            current: Mutex::new(current),
        }
    }

    /// Fold one exchange into the aggregate and persist it
    ///
    /// Readers see either the previous or the new aggregate, never a mix.
    pub fn record(
        &self,
        usage: &TokenUsage,
        latency_ms: u64,
        inbox_id: &InboxId,
        arrival: DateTime<Utc>,
    ) -> MetricsAggregate {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let next = current.record(usage, latency_ms, inbox_id, arrival);
        self.persistence.set(storage_keys::METRICS, &next);
        debug!(
            inbox_id = %inbox_id,
            total_tokens = usage.total_tokens,
            latency_ms,
            "Recorded exchange metrics"
        );
        current.clone_from(&next);
        next
    }

    /// Copy of the current aggregate
    #[must_use]
    pub fn snapshot(&self) -> MetricsAggregate {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the aggregate from storage, picking up writes by other processes
    pub fn reload(&self) -> MetricsAggregate {
        let stored = self
            .persistence
            .get(storage_keys::METRICS, MetricsAggregate::default());
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.clone_from(&stored);
        stored
    }
}
