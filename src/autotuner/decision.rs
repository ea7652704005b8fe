//! Decision Engine: table-driven per-issue-kind suggestion generation.
//! Closed to new issue kinds only by explicit extension of the match below.

use super::types::{
    param_or, CollectionMetrics, IndexFamily, IssueKind, OptimizationSuggestion, PerformanceAnalysis, TuningAction,
    DEFAULT_EF, DEFAULT_M, DEFAULT_NPROBE,
};
use chrono::Utc;

const DEFAULT_MIN_SAMPLES: usize = 100;

pub struct DecisionEngine {
    min_samples: usize,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self {
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Emits at most one suggestion. Returns `None` below the sample
    /// threshold or when the analysis flagged no issue.
    pub fn decide(&self, analysis: &PerformanceAnalysis, metrics: &CollectionMetrics) -> Option<OptimizationSuggestion> {
        if analysis.sample_count < self.min_samples {
            return None;
        }
        let issue = analysis.issue?;
        let family = IndexFamily::classify(&metrics.index_type);
        suggest(issue, family, metrics, analysis.severity)
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn suggest(
    issue: IssueKind,
    family: IndexFamily,
    metrics: &CollectionMetrics,
    severity: f64,
) -> Option<OptimizationSuggestion> {
    let severity_pct = severity * 100.0;
    let base = |action: TuningAction, current, suggested, lat, rec, mem, rebuild, confidence, reason: String| {
        OptimizationSuggestion {
            collection: metrics.collection.clone(),
            action,
            current_value: current,
            suggested_value: suggested,
            expected_latency_change: lat,
            expected_recall_change: rec,
            expected_memory_change: mem,
            rebuild_required: rebuild,
            confidence,
            reason,
            issued_at: Utc::now(),
        }
    };

    match (issue, family) {
        (IssueKind::LowRecall, IndexFamily::Hnsw) => {
            let current = param_or(&metrics.current_search_params, "ef", DEFAULT_EF);
            let suggested = ((current as f64) * 1.5).round() as i64;
            Some(base(
                TuningAction::IncreaseEf,
                current,
                suggested,
                0.30,
                0.05,
                0.0,
                false,
                0.80,
                format!("ef {current} -> {suggested}: recall is {severity_pct:.1}% below target"),
            ))
        }
        (IssueKind::LowRecall, IndexFamily::Ivf) => {
            let current = param_or(&metrics.current_search_params, "nprobe", DEFAULT_NPROBE);
            let suggested = ((current as f64) * 1.5).round() as i64;
            Some(base(
                TuningAction::IncreaseNprobe,
                current,
                suggested,
                0.25,
                0.05,
                0.0,
                false,
                0.80,
                format!("nprobe {current} -> {suggested}: recall is {severity_pct:.1}% below target"),
            ))
        }
        (IssueKind::HighLatency, IndexFamily::Hnsw) => {
            let current = param_or(&metrics.current_search_params, "ef", DEFAULT_EF);
            let suggested = (((current as f64) * 0.8).round() as i64).max(32);
            Some(base(
                TuningAction::DecreaseEf,
                current,
                suggested,
                -0.20,
                -0.02,
                0.0,
                false,
                0.85,
                format!("ef {current} -> {suggested}: P95 latency is {severity_pct:.1}% above target"),
            ))
        }
        (IssueKind::HighLatency, IndexFamily::Ivf) => {
            let current = param_or(&metrics.current_search_params, "nprobe", DEFAULT_NPROBE);
            let suggested = (((current as f64) * 0.75).round() as i64).max(16);
            Some(base(
                TuningAction::DecreaseNprobe,
                current,
                suggested,
                -0.25,
                -0.03,
                0.0,
                false,
                0.85,
                format!("nprobe {current} -> {suggested}: P95 latency is {severity_pct:.1}% above target"),
            ))
        }
        (IssueKind::HighMemory, IndexFamily::Hnsw) => {
            let current = param_or(&metrics.current_index_params, "M", DEFAULT_M);
            let suggested = (((current as f64) * 0.75).round() as i64).max(8);
            Some(base(
                TuningAction::RebuildSmallerM,
                current,
                suggested,
                0.0,
                -0.02,
                -0.25,
                true,
                0.70,
                format!("M {current} -> {suggested}: memory is {severity_pct:.1}% over budget, rebuild required"),
            ))
        }
        (IssueKind::OverProvisioned, IndexFamily::Hnsw) => {
            let current = param_or(&metrics.current_search_params, "ef", DEFAULT_EF);
            let suggested = (((current as f64) * 0.75).round() as i64).max(32);
            Some(base(
                TuningAction::DecreaseEf,
                current,
                suggested,
                -0.15,
                -0.02,
                0.0,
                false,
                0.75,
                format!("ef {current} -> {suggested}: collection is over-provisioned"),
            ))
        }
        (IssueKind::OverProvisioned, IndexFamily::Ivf) => {
            let current = param_or(&metrics.current_search_params, "nprobe", DEFAULT_NPROBE);
            let suggested = (((current as f64) * 0.75).round() as i64).max(16);
            Some(base(
                TuningAction::DecreaseNprobe,
                current,
                suggested,
                -0.20,
                -0.02,
                0.0,
                false,
                0.75,
                format!("nprobe {current} -> {suggested}: collection is over-provisioned"),
            ))
        }
        // HighMemory on non-HNSW families and any issue on an unrecognised
        // index family have no documented recommendation.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn metrics_with_search_param(key: &str, value: i64) -> CollectionMetrics {
        let mut search_params = HashMap::new();
        search_params.insert(key.to_string(), super::super::types::ParameterValue::Integer(value));
        CollectionMetrics {
            collection: "c1".to_string(),
            index_type: "HNSW".to_string(),
            p50_latency_ms: 10.0,
            p95_latency_ms: 20.0,
            p99_latency_ms: 30.0,
            mean_latency_ms: 12.0,
            mean_recall: 0.85,
            min_recall: 0.80,
            mean_memory_bytes: 1e9,
            mean_cpu_usage: 0.5,
            current_search_params: search_params,
            current_index_params: HashMap::new(),
            sample_count: 200,
            window_secs: 86400,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn scenario_low_recall_on_hnsw() {
        let metrics = metrics_with_search_param("ef", 64);
        let analysis = PerformanceAnalysis {
            collection: "c1".to_string(),
            needs_optimization: true,
            issue: Some(IssueKind::LowRecall),
            severity: 0.10,
            sample_count: 200,
        };
        let suggestion = DecisionEngine::new().decide(&analysis, &metrics).unwrap();
        assert_eq!(suggestion.action, TuningAction::IncreaseEf);
        assert_eq!(suggestion.current_value, 64);
        assert_eq!(suggestion.suggested_value, 96);
        assert!(!suggestion.rebuild_required);
        assert!(suggestion.expected_recall_change > 0.0);
        assert!((suggestion.confidence - 0.80).abs() < 1e-9);
    }

    #[test]
    fn scenario_high_memory_on_hnsw_requires_rebuild() {
        let mut metrics = metrics_with_search_param("ef", 64);
        metrics.current_index_params.insert("M".to_string(), super::super::types::ParameterValue::Integer(16));
        let analysis = PerformanceAnalysis {
            collection: "c1".to_string(),
            needs_optimization: true,
            issue: Some(IssueKind::HighMemory),
            severity: 0.20,
            sample_count: 200,
        };
        let suggestion = DecisionEngine::new().decide(&analysis, &metrics).unwrap();
        assert_eq!(suggestion.action, TuningAction::RebuildSmallerM);
        assert_eq!(suggestion.suggested_value, 12);
        assert!(suggestion.rebuild_required);
        assert!((suggestion.expected_memory_change - (-0.25)).abs() < 1e-9);
        assert!((suggestion.confidence - 0.70).abs() < 1e-9);
    }

    #[test]
    fn below_min_samples_yields_no_suggestion() {
        let metrics = metrics_with_search_param("ef", 64);
        let analysis = PerformanceAnalysis {
            collection: "c1".to_string(),
            needs_optimization: false,
            issue: Some(IssueKind::LowRecall),
            severity: 0.10,
            sample_count: 5,
        };
        assert!(DecisionEngine::new().decide(&analysis, &metrics).is_none());
    }

    #[test]
    fn no_issue_yields_no_suggestion() {
        let metrics = metrics_with_search_param("ef", 64);
        let analysis = PerformanceAnalysis {
            collection: "c1".to_string(),
            needs_optimization: false,
            issue: None,
            severity: 0.0,
            sample_count: 200,
        };
        assert!(DecisionEngine::new().decide(&analysis, &metrics).is_none());
    }

    #[test]
    fn high_memory_on_non_hnsw_family_is_undocumented() {
        let mut metrics = metrics_with_search_param("nprobe", 32);
        metrics.index_type = "IVF_FLAT".to_string();
        let analysis = PerformanceAnalysis {
            collection: "c1".to_string(),
            needs_optimization: true,
            issue: Some(IssueKind::HighMemory),
            severity: 0.20,
            sample_count: 200,
        };
        assert!(DecisionEngine::new().decide(&analysis, &metrics).is_none());
    }

    #[test]
    fn missing_param_falls_back_to_documented_default() {
        let metrics = CollectionMetrics {
            collection: "c1".to_string(),
            index_type: "HNSW".to_string(),
            p50_latency_ms: 10.0,
            p95_latency_ms: 20.0,
            p99_latency_ms: 30.0,
            mean_latency_ms: 12.0,
            mean_recall: 0.80,
            min_recall: 0.75,
            mean_memory_bytes: 1e9,
            mean_cpu_usage: 0.5,
            current_search_params: HashMap::new(),
            current_index_params: HashMap::new(),
            sample_count: 200,
            window_secs: 86400,
            last_updated: Utc::now(),
        };
        let analysis = PerformanceAnalysis {
            collection: "c1".to_string(),
            needs_optimization: true,
            issue: Some(IssueKind::LowRecall),
            severity: 0.10,
            sample_count: 200,
        };
        let suggestion = DecisionEngine::new().decide(&analysis, &metrics).unwrap();
        assert_eq!(suggestion.current_value, DEFAULT_EF);
    }
}
