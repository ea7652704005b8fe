//! Data model for the Adaptive Query Router.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Raw telemetry as pushed by a caller of `UpdateNodeMetrics`. The router
/// derives and stores the health score itself; callers never set it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetricsInput {
    /// CPU utilisation in [0,1].
    pub cpu_usage: f64,
    /// Memory utilisation in [0,1].
    pub memory_usage: f64,
    /// Cache-hit rate in [0,1].
    pub cache_hit_rate: f64,
    pub p95_latency_ms: Option<f64>,
    pub p99_latency_ms: Option<f64>,
    pub qps: f64,
    pub active_queries: u64,
    pub local_segments: HashSet<String>,
}

/// The router's stored view of a node: raw telemetry plus the derived
/// health score and the time it was last written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub node_id: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub cache_hit_rate: f64,
    pub p95_latency_ms: Option<f64>,
    pub p99_latency_ms: Option<f64>,
    pub qps: f64,
    pub active_queries: u64,
    pub local_segments: HashSet<String>,
    /// Derived at update time by [`crate::router::balancer::health_score`];
    /// reused by health filtering so the formula is computed exactly once
    /// per update rather than on every routing call.
    pub health_score: f64,
    #[serde(skip, default = "Instant::now")]
    pub last_update: Instant,
}

impl NodeMetrics {
    pub fn is_stale(&self, staleness_limit: Duration) -> bool {
        self.last_update.elapsed() > staleness_limit
    }
}

/// A search request carrying the segments it needs and a batch-size hint.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub required_segments: Vec<String>,
    pub batch_size_hint: u32,
}

/// Configuration recognised by the router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub cpu_weight: f64,
    pub memory_weight: f64,
    pub cache_weight: f64,
    pub latency_weight: f64,
    pub max_cpu_usage: f64,
    pub max_memory_usage: f64,
    pub min_health_score: f64,
    pub metrics_staleness_limit: Duration,
    pub metrics_update_interval: Duration,
    pub rebalance_interval: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cpu_weight: 0.3,
            memory_weight: 0.2,
            cache_weight: 0.3,
            latency_weight: 0.2,
            max_cpu_usage: 0.9,
            max_memory_usage: 0.85,
            min_health_score: 0.3,
            metrics_staleness_limit: Duration::from_secs(30),
            metrics_update_interval: Duration::from_secs(10),
            rebalance_interval: Duration::from_secs(60),
        }
    }
}

/// Fixed weights used for the health-score formula, independent of whatever
/// weights a caller configures for routing scores.
pub const HEALTH_CPU_WEIGHT: f64 = 0.3;
pub const HEALTH_MEMORY_WEIGHT: f64 = 0.2;
pub const HEALTH_CACHE_WEIGHT: f64 = 0.3;
pub const HEALTH_LATENCY_WEIGHT: f64 = 0.2;
