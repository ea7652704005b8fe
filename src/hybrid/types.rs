//! Hybrid Search Optimizer data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    String,
    Boolean,
}

/// Per-field statistics used by the selectivity estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldStatistics {
    pub field: String,
    pub data_type: DataType,
    pub cardinality: u64,
    pub value_frequency: HashMap<String, u64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub total_count: u64,
}

/// Groups field statistics for a collection, cached with an age-based
/// eviction policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStatistics {
    pub collection: String,
    pub total_rows: u64,
    pub fields: HashMap<String, FieldStatistics>,
    pub last_updated: DateTime<Utc>,
}

/// A scalar predicate node, parsed from an opaque serialised blob. The
/// optimizer never constructs these
/// directly; the selectivity estimator walks them when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Predicate {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    In { field: String, values: Vec<String> },
    NotIn { field: String, values: Vec<String> },
    Range { field: String, min: Option<f64>, max: Option<f64> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Opaque search request carrying a serialised predicate blob — the
/// optimizer only ever inspects its byte length and, when parseable, its
/// predicate tree.
#[derive(Debug, Clone)]
pub struct HybridRequest {
    pub collection: String,
    pub predicate_blob: Vec<u8>,
    pub predicate: Option<Predicate>,
    pub sealed_segments: HashSet<String>,
    pub growing_segments: HashSet<String>,
}

impl HybridRequest {
    pub fn predicate_len(&self) -> usize {
        self.predicate_blob.len()
    }

    pub fn is_empty_predicate(&self) -> bool {
        self.predicate_blob.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
    FilterThenSearch,
    SearchThenFilter,
    ParallelHybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub plan_type: PlanType,
    pub estimated_selectivity: f64,
    pub advisory_cost: f64,
}

#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    pub highly_selective_threshold: f64,
    pub broad_filter_threshold: f64,
    pub parallel_execution_enabled: bool,
    pub stats_max_age: std::time::Duration,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            highly_selective_threshold: 0.01,
            broad_filter_threshold: 0.50,
            parallel_execution_enabled: true,
            stats_max_age: std::time::Duration::from_secs(3600),
        }
    }
}
