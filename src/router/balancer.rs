//! Weighted Balancer: pure scoring and ordering over a candidate set.
//!
//! A scoring config plus a function that reduces a slice of candidates to an
//! ordered selection. Pure arithmetic with no locks or history — the router
//! holds all state, the balancer only ranks.

use super::types::{
    NodeMetrics, RouterConfig, HEALTH_CACHE_WEIGHT, HEALTH_CPU_WEIGHT, HEALTH_LATENCY_WEIGHT,
    HEALTH_MEMORY_WEIGHT,
};

/// Sentinel node id returned by [`best_single_node`] when there are no
/// candidates.
pub const NO_NODE: i64 = -1;

/// Fraction of requested segments present locally, or the node's overall
/// cache-hit rate when no segments were named.
pub fn locality(node: &NodeMetrics, requested_segments: &[String]) -> f64 {
    if requested_segments.is_empty() {
        return node.cache_hit_rate;
    }
    let present = requested_segments
        .iter()
        .filter(|s| node.local_segments.contains(*s))
        .count();
    present as f64 / requested_segments.len() as f64
}

/// Latency contribution, capped at `weight` to keep score components
/// comparable.
fn capped_latency_term(p95_ms: Option<f64>, weight: f64) -> f64 {
    match p95_ms {
        Some(p95) if p95 > 0.0 => (10.0 / p95).min(1.0) * weight,
        _ => 0.0,
    }
}

/// The routing score for a single candidate.
pub fn routing_score(node: &NodeMetrics, requested_segments: &[String], cfg: &RouterConfig) -> f64 {
    let locality = locality(node, requested_segments);
    cfg.cpu_weight * (1.0 - node.cpu_usage)
        + cfg.memory_weight * (1.0 - node.memory_usage)
        + cfg.cache_weight * locality
        + capped_latency_term(node.p95_latency_ms, cfg.latency_weight)
}

/// The health-score formula: same shape as the routing score but with the
/// fixed 0.3/0.2/0.3/0.2 weights, and locality is always the node's overall
/// cache-hit rate (no segment is "requested" at update time).
pub fn health_score(node_cpu_usage: f64, node_memory_usage: f64, cache_hit_rate: f64, p95_latency_ms: Option<f64>) -> f64 {
    let score = HEALTH_CPU_WEIGHT * (1.0 - node_cpu_usage)
        + HEALTH_MEMORY_WEIGHT * (1.0 - node_memory_usage)
        + HEALTH_CACHE_WEIGHT * cache_hit_rate
        + capped_latency_term(p95_latency_ms, HEALTH_LATENCY_WEIGHT);
    score.clamp(0.0, 1.0)
}

/// Sorts scored candidates by descending score, ties broken by node id, and
/// truncates to `k`.
pub fn select_top_k(mut scored: Vec<(NodeMetrics, f64)>, k: usize) -> Vec<NodeMetrics> {
    scored.sort_by(|(a, score_a), (b, score_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    scored.into_iter().take(k).map(|(n, _)| n).collect()
}

/// Default selection count for a routing request.
pub fn selection_count(batch_size_hint: u32, candidate_count: usize) -> usize {
    let wanted = if batch_size_hint > 10 { 3 } else { 1 };
    wanted.min(candidate_count)
}

/// Returns the single best-scoring node id, or [`NO_NODE`] when `candidates`
/// is empty. Used by internal paths that want one node without going
/// through the full `RouteQuery` pipeline.
pub fn best_single_node(
    candidates: &[NodeMetrics],
    requested_segments: &[String],
    cfg: &RouterConfig,
) -> i64 {
    candidates
        .iter()
        .map(|n| (n, routing_score(n, requested_segments, cfg)))
        .max_by(|(a, sa), (b, sb)| {
            sa.partial_cmp(sb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.node_id.cmp(&a.node_id))
        })
        .and_then(|(n, _)| n.node_id.parse::<i64>().ok())
        .unwrap_or(NO_NODE)
}
