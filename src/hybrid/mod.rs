//! Hybrid Search Optimizer subsystem: selectivity-based plan selection for
//! vector + scalar-filter queries.

mod optimizer;
mod selectivity;
mod stats_cache;
mod types;

pub use optimizer::HybridOptimizer;
pub use selectivity::{estimate as estimate_selectivity, DEFAULT_SELECTIVITY};
pub use stats_cache::StatsCache;
pub use types::{
    CollectionStatistics, DataType, FieldStatistics, HybridRequest, OptimizationConfig, Plan, PlanType, Predicate,
};
