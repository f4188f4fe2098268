// ABOUTME: Token and latency usage aggregate partitioned by inbox and UTC calendar day
// ABOUTME: Pure reducer plus read-side rollups; serialized shape matches previously stored aggregates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Usage Metrics
//!
//! `MetricsAggregate::record` is a pure function from the current aggregate
//! and one successful exchange to the next aggregate. Day keys are always
//! derived in UTC so that users in different regions bucket identically.
//!
//! The reducer is not idempotent: recording the same exchange twice counts
//! it twice. Callers prevent double counting by recording each confirmed
//! reply exactly once.

use super::{InboxId, TokenUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Counters for one inbox on one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMetrics {
    /// Prompt tokens
    #[serde(default)]
    pub input_tokens: u64,
    /// Completion tokens
    #[serde(default)]
    pub output_tokens: u64,
    /// Cached prompt tokens
    #[serde(default)]
    pub cached_tokens: u64,
    /// Total billed tokens
    #[serde(default)]
    pub total_tokens: u64,
    /// Sum of reply latencies in milliseconds
    #[serde(default, rename = "latency")]
    pub latency_ms_sum: u64,
    /// Number of exchanges
    #[serde(default, rename = "count")]
    pub exchange_count: u64,
}

impl DayMetrics {
    fn add_exchange(&mut self, usage: &TokenUsage, latency_ms: u64) {
        self.input_tokens = self.input_tokens.saturating_add(usage.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(usage.output_tokens);
        self.cached_tokens = self.cached_tokens.saturating_add(usage.cached_tokens);
        self.total_tokens = self.total_tokens.saturating_add(usage.total_tokens);
        self.latency_ms_sum = self.latency_ms_sum.saturating_add(latency_ms);
        self.exchange_count = self.exchange_count.saturating_add(1);
    }

    fn merge(&mut self, other: &Self) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cached_tokens = self.cached_tokens.saturating_add(other.cached_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        self.latency_ms_sum = self.latency_ms_sum.saturating_add(other.latency_ms_sum);
        self.exchange_count = self.exchange_count.saturating_add(other.exchange_count);
    }
}

/// Per-day buckets of one inbox
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxMetrics {
    /// Buckets keyed by `YYYY-MM-DD` (UTC)
    #[serde(default, rename = "byDay")]
    pub by_day: BTreeMap<String, DayMetrics>,
}

/// Process-wide usage aggregate, persisted across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsAggregate {
    /// Buckets keyed by inbox id
    #[serde(default, rename = "byInbox")]
    pub by_inbox: BTreeMap<String, InboxMetrics>,
    /// Total tokens across all inboxes
    #[serde(default, rename = "totalTokens")]
    pub total_tokens: u64,
    /// Total reply latency across all inboxes
    #[serde(default, rename = "totalLatency")]
    pub total_latency_ms: u64,
    /// Number of recorded exchanges
    #[serde(default, rename = "messageCount")]
    pub message_count: u64,
    /// When the first exchange was recorded; set once
    #[serde(default, rename = "firstUse", skip_serializing_if = "Option::is_none")]
    pub first_use: Option<DateTime<Utc>>,
}

/// Calendar day key for a timestamp, in UTC
#[must_use]
pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

impl MetricsAggregate {
    /// Fold one successful exchange into the aggregate
    #[must_use]
    pub fn record(
        &self,
        usage: &TokenUsage,
        latency_ms: u64,
        inbox_id: &InboxId,
        arrival: DateTime<Utc>,
    ) -> Self {
        let mut next = self.clone();
        next.by_inbox
            .entry(inbox_id.to_string())
            .or_default()
            .by_day
            .entry(day_key(arrival))
            .or_default()
            .add_exchange(usage, latency_ms);

        next.total_tokens = next.total_tokens.saturating_add(usage.total_tokens);
        next.total_latency_ms = next.total_latency_ms.saturating_add(latency_ms);
        next.message_count = next.message_count.saturating_add(1);
        next.first_use.get_or_insert(arrival);
        next
    }

    /// Bucket for one inbox and day key
    #[must_use]
    pub fn day(&self, inbox_id: &InboxId, day: &str) -> Option<&DayMetrics> {
        self.by_inbox
            .get(inbox_id.as_str())
            .and_then(|inbox| inbox.by_day.get(day))
    }

    /// Totals of each inbox across all days
    #[must_use]
    pub fn inbox_totals(&self) -> BTreeMap<String, DayMetrics> {
        self.by_inbox
            .iter()
            .map(|(inbox_id, inbox)| {
                let mut totals = DayMetrics::default();
                for day in inbox.by_day.values() {
                    totals.merge(day);
                }
                (inbox_id.clone(), totals)
            })
            .collect()
    }

    /// Sorted union of the day keys seen across all inboxes
    #[must_use]
    pub fn day_keys(&self) -> Vec<String> {
        self.by_inbox
            .values()
            .flat_map(|inbox| inbox.by_day.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Mean reply latency per exchange, rounded; zero before any exchange
    #[must_use]
    pub fn average_latency_ms(&self) -> u64 {
        if self.message_count == 0 {
            return 0;
        }
        (self.total_latency_ms as f64 / self.message_count as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn usage(total: u64) -> TokenUsage {
        TokenUsage {
            input_tokens: total / 2,
            output_tokens: total - total / 2,
            cached_tokens: 0,
            total_tokens: total,
            model: None,
        }
    }

    #[test]
    fn test_record_creates_bucket_and_rollups() {
        let inbox = InboxId::new("27");
        let at = Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap();
        let next = MetricsAggregate::default().record(&usage(120), 350, &inbox, at);

        let bucket = next.day(&inbox, "2025-01-14").unwrap();
        assert_eq!(bucket.total_tokens, 120);
        assert_eq!(bucket.latency_ms_sum, 350);
        assert_eq!(bucket.exchange_count, 1);
        assert_eq!(next.total_tokens, 120);
        assert_eq!(next.message_count, 1);
        assert_eq!(next.first_use, Some(at));
    }

    #[test]
    fn test_first_use_is_never_overwritten() {
        let inbox = InboxId::new("27");
        let first = Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let next = MetricsAggregate::default()
            .record(&usage(10), 5, &inbox, first)
            .record(&usage(10), 5, &inbox, later);
        assert_eq!(next.first_use, Some(first));
        assert_eq!(next.day_keys(), ["2025-01-14", "2025-02-01"]);
    }

    #[test]
    fn test_day_key_uses_utc() {
        let late_evening_brt = chrono::FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 14, 22, 30, 0)
            .unwrap();
        assert_eq!(day_key(late_evening_brt.with_timezone(&Utc)), "2025-01-15");
    }

    #[test]
    fn test_replaying_counts_twice() {
        let inbox = InboxId::new("1");
        let at = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let once = MetricsAggregate::default().record(&usage(50), 100, &inbox, at);
        let twice = once.record(&usage(50), 100, &inbox, at);
        assert_eq!(twice.total_tokens, 100);
        assert_eq!(twice.day(&inbox, "2025-03-03").unwrap().exchange_count, 2);
    }

    #[test]
    fn test_inbox_totals_and_average() {
        let at = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let next = MetricsAggregate::default()
            .record(&usage(100), 300, &InboxId::new("1"), at)
            .record(&usage(40), 101, &InboxId::new("1"), at + chrono::Duration::days(1))
            .record(&usage(7), 0, &InboxId::new("2"), at);

        let totals = next.inbox_totals();
        assert_eq!(totals["1"].total_tokens, 140);
        assert_eq!(totals["1"].exchange_count, 2);
        assert_eq!(totals["2"].total_tokens, 7);
        assert_eq!(next.average_latency_ms(), 134);
        assert_eq!(MetricsAggregate::default().average_latency_ms(), 0);
    }

    #[test]
    fn test_loads_previously_stored_shape() {
        let stored = serde_json::json!({
            "byInbox": {"27": {"byDay": {"2025-01-14": {
                "input_tokens": 60, "output_tokens": 60, "cached_tokens": 0,
                "total_tokens": 120, "latency": 350, "count": 1
            }}}},
            "totalTokens": 120,
            "totalLatency": 350,
            "messageCount": 1,
            "firstUse": "2025-01-14T10:00:00.000Z"
        });
        let aggregate: MetricsAggregate = serde_json::from_value(stored).unwrap();
        assert_eq!(
            aggregate
                .day(&InboxId::new("27"), "2025-01-14")
                .unwrap()
                .latency_ms_sum,
            350
        );
        assert!(aggregate.first_use.is_some());
    }
}
