//! Access Tracker: per-segment access statistics.

use super::types::{SegmentAccessStats, Tier, EMA_ALPHA};
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Thread-safe for concurrent readers and writers; returned statistics are
/// copies so callers can never mutate tracker-internal state through them.
#[derive(Default)]
pub struct AccessTracker {
    stats: DashMap<String, SegmentAccessStats>,
}

impl AccessTracker {
    pub fn new() -> Self {
        Self {
            stats: DashMap::new(),
        }
    }

    /// Records an access: `last_access <- now`, `count <- count + 1`,
    /// `bytes_read += n`, `avg_latency <- EMA(alpha=0.3)`. `count` is
    /// strictly non-decreasing because the entry is updated under a single
    /// shard lock per call.
    pub fn record_access(&self, segment_id: &str, bytes: u64, latency_ms: f64) {
        let mut entry = self
            .stats
            .entry(segment_id.to_string())
            .or_insert_with(|| SegmentAccessStats::new(segment_id));

        entry.last_access = Instant::now();
        entry.access_count += 1;
        entry.bytes_read += bytes;
        entry.avg_latency_ms = if entry.access_count == 1 {
            latency_ms
        } else {
            EMA_ALPHA * latency_ms + (1.0 - EMA_ALPHA) * entry.avg_latency_ms
        };
    }

    pub fn get(&self, segment_id: &str) -> Option<SegmentAccessStats> {
        self.stats.get(segment_id).map(|e| e.clone())
    }

    pub fn all(&self) -> Vec<SegmentAccessStats> {
        self.stats.iter().map(|e| e.value().clone()).collect()
    }

    /// Stamps `current_tier` and `last_migration` atomically with respect to
    /// other readers of the same entry.
    pub fn set_tier(&self, segment_id: &str, tier: Tier) {
        let mut entry = self
            .stats
            .entry(segment_id.to_string())
            .or_insert_with(|| SegmentAccessStats::new(segment_id));
        entry.current_tier = tier;
        entry.last_migration = Some(Instant::now());
    }

    pub fn tier_of(&self, segment_id: &str) -> Option<Tier> {
        self.stats.get(segment_id).map(|e| e.current_tier)
    }

    /// Drops tracked entries whose last access is older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        self.stats
            .retain(|_, stats| stats.last_access.elapsed() <= max_age);
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
