//! Metrics Collector: bounded, time-windowed rolling buffers of per-query
//! observations, aggregated on demand.

use super::types::{CollectionMetrics, QueryMetrics};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;

const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 3600);
const DEFAULT_MAX_SAMPLES: usize = 10_000;

struct CollectionBuffer {
    samples: VecDeque<QueryMetrics>,
}

impl CollectionBuffer {
    fn new() -> Self {
        Self {
            samples: VecDeque::new(),
        }
    }

    fn push(&mut self, sample: QueryMetrics, retention: Duration, max_samples: usize) {
        self.samples.push_back(sample);
        let cutoff = Utc::now() - ChronoDuration::from_std(retention).unwrap_or(ChronoDuration::zero());
        while let Some(front) = self.samples.front() {
            if front.timestamp < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
        while self.samples.len() > max_samples {
            self.samples.pop_front();
        }
    }
}

/// Per-collection rolling buffers, time- and count-bounded on every insert.
pub struct MetricsCollector {
    buffers: DashMap<String, CollectionBuffer>,
    retention: Duration,
    max_samples: usize,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            buffers: DashMap::new(),
            retention: DEFAULT_RETENTION,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    pub fn with_limits(mut self, retention: Duration, max_samples: usize) -> Self {
        self.retention = retention;
        self.max_samples = max_samples;
        self
    }

    pub fn record(&self, sample: QueryMetrics) {
        let mut entry = self
            .buffers
            .entry(sample.collection.clone())
            .or_insert_with(CollectionBuffer::new);
        entry.push(sample, self.retention, self.max_samples);
    }

    /// Drops samples older than the retention period across all collections.
    pub fn cleanup(&self) {
        let cutoff = Utc::now() - ChronoDuration::from_std(self.retention).unwrap_or(ChronoDuration::zero());
        for mut entry in self.buffers.iter_mut() {
            while let Some(front) = entry.samples.front() {
                if front.timestamp < cutoff {
                    entry.samples.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    pub fn known_collections(&self) -> Vec<String> {
        self.buffers.iter().map(|e| e.key().clone()).collect()
    }

    /// Aggregates the samples of `collection` falling within `window`
    /// (measured back from now). Returns `None` if no samples fall inside it.
    pub fn get_collection_metrics(&self, collection: &str, window: Duration) -> Option<CollectionMetrics> {
        let buffer = self.buffers.get(collection)?;
        let cutoff: DateTime<Utc> = Utc::now() - ChronoDuration::from_std(window).unwrap_or(ChronoDuration::zero());
        let in_window: Vec<&QueryMetrics> = buffer.samples.iter().filter(|s| s.timestamp >= cutoff).collect();
        if in_window.is_empty() {
            return None;
        }
        Some(aggregate(collection, &in_window, window))
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn percentile(sorted: &[f64], k: u64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let idx = ((n as u64 * k) / 100) as usize;
    sorted[idx.min(n - 1)]
}

fn aggregate(collection: &str, samples: &[&QueryMetrics], window: Duration) -> CollectionMetrics {
    let mut latencies: Vec<f64> = samples.iter().map(|s| s.latency_ms).collect();
    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = samples.len() as f64;
    let mean_recall = samples.iter().map(|s| s.recall).sum::<f64>() / n;
    let min_recall = samples.iter().map(|s| s.recall).fold(f64::INFINITY, f64::min);
    let mean_memory = samples.iter().map(|s| s.memory_bytes as f64).sum::<f64>() / n;
    let mean_cpu = samples.iter().map(|s| s.cpu_usage).sum::<f64>() / n;
    let mean_latency = latencies.iter().sum::<f64>() / n;

    let most_recent = samples
        .iter()
        .max_by_key(|s| s.timestamp)
        .expect("samples non-empty");

    CollectionMetrics {
        collection: collection.to_string(),
        index_type: most_recent.index_type.clone(),
        p50_latency_ms: percentile(&latencies, 50),
        p95_latency_ms: percentile(&latencies, 95),
        p99_latency_ms: percentile(&latencies, 99),
        mean_latency_ms: mean_latency,
        mean_recall,
        min_recall,
        mean_memory_bytes: mean_memory,
        mean_cpu_usage: mean_cpu,
        current_search_params: most_recent.search_params.clone(),
        current_index_params: most_recent.index_params.clone(),
        sample_count: samples.len(),
        window_secs: window.as_secs(),
        last_updated: Utc::now(),
    }
}
