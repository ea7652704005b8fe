//! Auto-Tuner data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A numeric value arriving in an opaque search/index parameter map.
/// Coerces any reasonable numeric encoding to `i64`/`f64` for the
/// well-known tunables (`ef`, `nprobe`, `M`); unknown keys are simply
/// absent and callers fall back to documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Float(f64),
}

impl ParameterValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(v) => Some(*v),
            ParameterValue::Float(v) => Some(*v as i64),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Integer(v) => Some(*v as f64),
            ParameterValue::Float(v) => Some(*v),
        }
    }
}

pub type ParameterMap = HashMap<String, ParameterValue>;

pub const DEFAULT_EF: i64 = 64;
pub const DEFAULT_NPROBE: i64 = 32;
pub const DEFAULT_M: i64 = 16;

pub fn param_or(params: &ParameterMap, key: &str, default: i64) -> i64 {
    params.get(key).and_then(ParameterValue::as_i64).unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFamily {
    Hnsw,
    Ivf,
    Other,
}

impl IndexFamily {
    pub fn classify(index_type: &str) -> Self {
        let lower = index_type.to_ascii_lowercase();
        if lower.contains("hnsw") {
            IndexFamily::Hnsw
        } else if lower.starts_with("ivf") {
            IndexFamily::Ivf
        } else {
            IndexFamily::Other
        }
    }
}

/// A single observed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub collection: String,
    pub index_type: String,
    pub latency_ms: f64,
    pub recall: f64,
    pub memory_bytes: u64,
    pub cpu_usage: f64,
    pub search_params: ParameterMap,
    pub index_params: ParameterMap,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated metrics over a retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetrics {
    pub collection: String,
    pub index_type: String,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub mean_latency_ms: f64,
    pub mean_recall: f64,
    pub min_recall: f64,
    pub mean_memory_bytes: f64,
    pub mean_cpu_usage: f64,
    pub current_search_params: ParameterMap,
    pub current_index_params: ParameterMap,
    pub sample_count: usize,
    pub window_secs: u64,
    pub last_updated: DateTime<Utc>,
}

/// Operator-set SLA targets for a collection. Defaults apply when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTarget {
    pub target_p95_latency_ms: f64,
    pub latency_tolerance: f64,
    pub target_recall: f64,
    pub recall_tolerance: f64,
    pub memory_budget_bytes: u64,
    pub memory_tolerance: f64,
}

impl Default for PerformanceTarget {
    fn default() -> Self {
        Self {
            target_p95_latency_ms: 50.0,
            latency_tolerance: 1.2,
            target_recall: 0.95,
            recall_tolerance: 0.95,
            memory_budget_bytes: 10 * 1024 * 1024 * 1024,
            memory_tolerance: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    LowRecall,
    HighLatency,
    HighMemory,
    OverProvisioned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    pub collection: String,
    pub needs_optimization: bool,
    pub issue: Option<IssueKind>,
    pub severity: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Degrading,
    Improving,
    LatencyDegrading,
    RecallDegrading,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuningAction {
    IncreaseEf,
    IncreaseNprobe,
    DecreaseEf,
    DecreaseNprobe,
    RebuildSmallerM,
}

/// A single emitted parameter-change recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub collection: String,
    pub action: TuningAction,
    pub current_value: i64,
    pub suggested_value: i64,
    pub expected_latency_change: f64,
    pub expected_recall_change: f64,
    pub expected_memory_change: f64,
    pub rebuild_required: bool,
    pub confidence: f64,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
}
