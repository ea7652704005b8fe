//! Performance Analyzer: compares aggregated metrics against per-collection
//! targets and picks the single highest-severity issue.

use super::types::{CollectionMetrics, IssueKind, PerformanceAnalysis, PerformanceTarget, TrendDirection};

const MIN_SAMPLES_FOR_OPTIMIZATION: usize = 10;

/// Priority-ordered: the first triggering check wins. `LowRecall` outranks
/// `HighLatency` outranks `HighMemory` outranks `OverProvisioned`.
pub fn analyze(metrics: &CollectionMetrics, target: &PerformanceTarget) -> PerformanceAnalysis {
    let mut analysis = PerformanceAnalysis {
        collection: metrics.collection.clone(),
        needs_optimization: false,
        issue: None,
        severity: 0.0,
        sample_count: metrics.sample_count,
    };

    if metrics.sample_count < MIN_SAMPLES_FOR_OPTIMIZATION {
        return analysis;
    }

    let recall_floor = target.target_recall * target.recall_tolerance;
    if metrics.mean_recall < recall_floor {
        analysis.issue = Some(IssueKind::LowRecall);
        analysis.severity = (target.target_recall - metrics.mean_recall) / target.target_recall;
        analysis.needs_optimization = true;
        return analysis;
    }

    let latency_ceiling = target.target_p95_latency_ms * target.latency_tolerance;
    if metrics.p95_latency_ms > latency_ceiling {
        analysis.issue = Some(IssueKind::HighLatency);
        analysis.severity = (metrics.p95_latency_ms - target.target_p95_latency_ms) / target.target_p95_latency_ms;
        analysis.needs_optimization = true;
        return analysis;
    }

    let memory_ceiling = target.memory_budget_bytes as f64 * target.memory_tolerance;
    if metrics.mean_memory_bytes > memory_ceiling {
        analysis.issue = Some(IssueKind::HighMemory);
        analysis.severity =
            (metrics.mean_memory_bytes - target.memory_budget_bytes as f64) / target.memory_budget_bytes as f64;
        analysis.needs_optimization = true;
        return analysis;
    }

    let over_provisioned = metrics.mean_recall > 1.05 * target.target_recall
        && metrics.p95_latency_ms < 0.8 * target.target_p95_latency_ms;
    if over_provisioned {
        analysis.issue = Some(IssueKind::OverProvisioned);
        analysis.severity = 0.5;
        analysis.needs_optimization = true;
    }

    analysis
}

fn relative_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous
}

/// Optional auxiliary signal comparing two consecutive aggregation windows.
pub fn detect_trend(current: &CollectionMetrics, previous: &CollectionMetrics) -> TrendDirection {
    let latency_change = relative_change(current.p95_latency_ms, previous.p95_latency_ms);
    let recall_change = relative_change(current.mean_recall, previous.mean_recall);

    let latency_up = latency_change > 0.10;
    let latency_down = latency_change < -0.10;
    let recall_down = recall_change < -0.05;
    let recall_up = recall_change > 0.05;

    if latency_up && recall_down {
        TrendDirection::Degrading
    } else if latency_down && recall_up {
        TrendDirection::Improving
    } else if latency_up {
        TrendDirection::LatencyDegrading
    } else if recall_down {
        TrendDirection::RecallDegrading
    } else {
        TrendDirection::Stable
    }
}
