//! Auto-Tuner orchestration: wires the collector, analyzer, and decision
//! engine into a scheduled, cadence-gated sweep.

use super::analyzer::analyze;
use super::collector::MetricsCollector;
use super::decision::DecisionEngine;
use super::types::{
    CollectionMetrics, OptimizationSuggestion, PerformanceAnalysis, PerformanceTarget, QueryMetrics, TuningAction,
};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 3600);
const DEFAULT_METRICS_WINDOW: Duration = Duration::from_secs(24 * 3600);

/// A single recorded parameter change, kept for `GetChangeHistory`. Phase 1
/// never actually applies a suggestion, so this fills in only once
/// `ApplySuggestion` grows teeth.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub collection: String,
    pub action: TuningAction,
    pub applied_at: DateTime<Utc>,
}

pub struct AutoTuner {
    id: String,
    description: String,
    active: AtomicBool,
    collector: MetricsCollector,
    decision_engine: DecisionEngine,
    targets: DashMap<String, PerformanceTarget>,
    suggestions: DashMap<String, OptimizationSuggestion>,
    history: RwLock<Vec<ChangeRecord>>,
    check_interval: Duration,
    metrics_window: Duration,
    last_check: RwLock<Option<DateTime<Utc>>>,
}

impl AutoTuner {
    pub fn new() -> Self {
        Self {
            id: "auto-tuner".to_string(),
            description: "Closed-loop controller emitting per-collection parameter suggestions".to_string(),
            active: AtomicBool::new(true),
            collector: MetricsCollector::new(),
            decision_engine: DecisionEngine::new(),
            targets: DashMap::new(),
            suggestions: DashMap::new(),
            history: RwLock::new(Vec::new()),
            check_interval: DEFAULT_CHECK_INTERVAL,
            metrics_window: DEFAULT_METRICS_WINDOW,
            last_check: RwLock::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::Relaxed);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn record_query_metrics(&self, sample: QueryMetrics) {
        self.collector.record(sample);
    }

    pub fn set_performance_target(&self, collection: &str, target: PerformanceTarget) {
        self.targets.insert(collection.to_string(), target);
    }

    fn target_for(&self, collection: &str) -> PerformanceTarget {
        self.targets.get(collection).map(|t| t.clone()).unwrap_or_default()
    }

    pub fn get_metrics(&self, collection: &str) -> Option<CollectionMetrics> {
        self.collector.get_collection_metrics(collection, self.metrics_window)
    }

    pub fn get_analysis(&self, collection: &str) -> Option<PerformanceAnalysis> {
        let metrics = self.get_metrics(collection)?;
        Some(analyze(&metrics, &self.target_for(collection)))
    }

    pub fn get_suggestion(&self, collection: &str) -> Option<OptimizationSuggestion> {
        self.suggestions.get(collection).map(|s| s.clone())
    }

    pub fn get_all_suggestions(&self) -> Vec<OptimizationSuggestion> {
        self.suggestions.iter().map(|e| e.value().clone()).collect()
    }

    pub fn get_change_history(&self) -> Vec<ChangeRecord> {
        self.history.read().clone()
    }

    /// Declared but intentionally non-applying; Phase 3 will give this a
    /// rollback-aware implementation.
    pub fn apply_suggestion(&self, _collection: &str) -> Result<()> {
        Err(CoreError::NotImplemented(
            "ApplySuggestion is a Phase 3 placeholder".to_string(),
        ))
    }

    /// Returns `true` if a sweep ran. No-op when disabled or called before
    /// `check_interval` has elapsed since the prior run.
    pub fn check(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        {
            let last = self.last_check.read();
            if let Some(last) = *last {
                let elapsed = Utc::now().signed_duration_since(last);
                if elapsed.to_std().unwrap_or(Duration::ZERO) < self.check_interval {
                    return false;
                }
            }
        }

        self.collector.cleanup();

        for collection in self.collector.known_collections() {
            // Per-collection failures never poison the sweep.
            if let Err(e) = self.sweep_one(&collection) {
                warn!(collection = %collection, error = %e, "auto-tuner sweep failed for collection");
            }
        }

        *self.last_check.write() = Some(Utc::now());
        true
    }

    fn sweep_one(&self, collection: &str) -> Result<()> {
        let metrics = self
            .collector
            .get_collection_metrics(collection, self.metrics_window)
            .ok_or_else(|| CoreError::NotFound(collection.to_string()))?;
        let target = self.target_for(collection);
        let analysis = analyze(&metrics, &target);
        debug!(collection = %collection, issue = ?analysis.issue, "auto-tuner analysis complete");
        if let Some(suggestion) = self.decision_engine.decide(&analysis, &metrics) {
            self.suggestions.insert(collection.to_string(), suggestion);
        }
        Ok(())
    }
}

impl Default for AutoTuner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample(collection: &str, latency: f64, recall: f64) -> QueryMetrics {
        let mut search_params = HashMap::new();
        search_params.insert("ef".to_string(), super::super::types::ParameterValue::Integer(64));
        QueryMetrics {
            collection: collection.to_string(),
            index_type: "HNSW".to_string(),
            latency_ms: latency,
            recall,
            memory_bytes: 1_000_000,
            cpu_usage: 0.4,
            search_params,
            index_params: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn check_is_noop_when_deactivated() {
        let tuner = AutoTuner::new();
        tuner.deactivate();
        for _ in 0..200 {
            tuner.record_query_metrics(sample("c1", 20.0, 0.80));
        }
        assert!(!tuner.check());
        assert!(tuner.get_suggestion("c1").is_none());
    }

    #[test]
    fn check_produces_suggestion_for_low_recall_collection() {
        let tuner = AutoTuner::new();
        for _ in 0..200 {
            tuner.record_query_metrics(sample("c1", 20.0, 0.80));
        }
        assert!(tuner.check());
        let suggestion = tuner.get_suggestion("c1").expect("suggestion expected");
        assert_eq!(suggestion.action, TuningAction::IncreaseEf);
    }

    #[test]
    fn second_check_within_interval_is_noop() {
        let tuner = AutoTuner::new();
        for _ in 0..200 {
            tuner.record_query_metrics(sample("c1", 20.0, 0.80));
        }
        assert!(tuner.check());
        assert!(!tuner.check());
    }

    #[test]
    fn apply_suggestion_is_not_implemented() {
        let tuner = AutoTuner::new();
        assert!(matches!(tuner.apply_suggestion("c1"), Err(CoreError::NotImplemented(_))));
    }

    #[test]
    fn custom_performance_target_changes_analysis() {
        let tuner = AutoTuner::new();
        for _ in 0..200 {
            tuner.record_query_metrics(sample("c1", 20.0, 0.80));
        }
        let mut lenient = PerformanceTarget::default();
        lenient.target_recall = 0.5;
        tuner.set_performance_target("c1", lenient);
        let analysis = tuner.get_analysis("c1").unwrap();
        assert!(analysis.issue.is_none());
    }
}
