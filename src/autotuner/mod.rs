//! Auto-Tuner subsystem: a closed-loop, read/recommend-only controller
//! that observes per-query performance and emits parameter-change
//! suggestions.

mod analyzer;
mod collector;
mod decision;
mod tuner;
mod types;

pub use analyzer::{analyze, detect_trend};
pub use collector::MetricsCollector;
pub use decision::DecisionEngine;
pub use tuner::{AutoTuner, ChangeRecord};
pub use types::{
    CollectionMetrics, IndexFamily, IssueKind, OptimizationSuggestion, ParameterMap, ParameterValue,
    PerformanceAnalysis, PerformanceTarget, QueryMetrics, TrendDirection, TuningAction,
};
