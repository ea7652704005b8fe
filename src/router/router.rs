//! Adaptive Query Router orchestrator.

use super::balancer;
use super::types::{NodeMetrics, NodeMetricsInput, RouterConfig, SearchRequest};
use crate::error::{CoreError, Result};
use crate::metrics::{MetricsSink, NoopMetricsSink};
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Real-time, metric-driven node selection for search requests.
///
/// All cross-thread mutation happens through `DashMap`/`DashSet` entries;
/// `RemoveNode` purges the node map and the segment locality index in one
/// pass so no reader ever observes a removed node still indexed.
pub struct AdaptiveRouter {
    config: RouterConfig,
    nodes: DashMap<String, NodeMetrics>,
    /// segment id -> node ids that cache it locally.
    locality_index: DashMap<String, DashSet<String>>,
    metrics_sink: Arc<dyn MetricsSink>,
}

impl AdaptiveRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            nodes: DashMap::new(),
            locality_index: DashMap::new(),
            metrics_sink: Arc::new(NoopMetricsSink),
        }
    }

    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics_sink = sink;
        self
    }

    /// Overwrites the node's entry, recomputes its health score, and updates
    /// the segment->nodes locality index for every segment listed as local.
    /// Idempotent; last write wins.
    pub fn update_node_metrics(&self, node_id: &str, input: NodeMetricsInput) {
        let health = balancer::health_score(
            input.cpu_usage,
            input.memory_usage,
            input.cache_hit_rate,
            input.p95_latency_ms,
        );

        // Drop this node from locality entries for segments it no longer
        // reports, then add it to the ones it does.
        if let Some(old) = self.nodes.get(node_id) {
            let stale_segments: Vec<String> = old
                .local_segments
                .difference(&input.local_segments)
                .cloned()
                .collect();
            drop(old);
            for seg in stale_segments {
                self.untrack_locality(&seg, node_id);
            }
        }
        for seg in &input.local_segments {
            self.locality_index
                .entry(seg.clone())
                .or_insert_with(DashSet::new)
                .insert(node_id.to_string());
        }

        self.nodes.insert(
            node_id.to_string(),
            NodeMetrics {
                node_id: node_id.to_string(),
                cpu_usage: input.cpu_usage,
                memory_usage: input.memory_usage,
                cache_hit_rate: input.cache_hit_rate,
                p95_latency_ms: input.p95_latency_ms,
                p99_latency_ms: input.p99_latency_ms,
                qps: input.qps,
                active_queries: input.active_queries,
                local_segments: input.local_segments,
                health_score: health,
                last_update: Instant::now(),
            },
        );
    }

    /// Deletes the node and its entries from the locality index. Purges
    /// empty locality entries so the index never accumulates stale keys.
    pub fn remove_node(&self, node_id: &str) {
        if let Some((_, node)) = self.nodes.remove(node_id) {
            for seg in &node.local_segments {
                self.untrack_locality(seg, node_id);
            }
        }
    }

    /// Removes `node_id` from segment `seg`'s locality set, dropping the
    /// set entirely once it's empty.
    fn untrack_locality(&self, seg: &str, node_id: &str) {
        let now_empty = match self.locality_index.get(seg) {
            Some(nodes) => {
                nodes.remove(node_id);
                nodes.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.locality_index.remove(seg);
        }
    }

    fn candidates(&self, request: &SearchRequest) -> Result<Vec<NodeMetrics>> {
        if request.required_segments.is_empty() {
            let all: Vec<NodeMetrics> = self.nodes.iter().map(|e| e.value().clone()).collect();
            if all.is_empty() {
                return Err(CoreError::NoCandidates(
                    "no nodes registered with the router".to_string(),
                ));
            }
            return Ok(all);
        }

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for seg in &request.required_segments {
            if let Some(node_ids) = self.locality_index.get(seg) {
                for id in node_ids.iter() {
                    if seen.insert(id.clone()) {
                        if let Some(node) = self.nodes.get(id.as_str()) {
                            out.push(node.clone());
                        }
                    }
                }
            }
        }

        if out.is_empty() {
            return Err(CoreError::NoCandidates(format!(
                "no node locally caches any of segments {:?}",
                request.required_segments
            )));
        }
        Ok(out)
    }

    fn healthy(&self, candidates: Vec<NodeMetrics>) -> Result<Vec<NodeMetrics>> {
        let filtered: Vec<NodeMetrics> = candidates
            .into_iter()
            .filter(|n| {
                n.cpu_usage <= self.config.max_cpu_usage
                    && n.memory_usage <= self.config.max_memory_usage
                    && n.health_score >= self.config.min_health_score
                    && !n.is_stale(self.config.metrics_staleness_limit)
            })
            .collect();

        if filtered.is_empty() {
            return Err(CoreError::NoHealthyNodes(
                "every candidate failed health or staleness filtering".to_string(),
            ));
        }
        Ok(filtered)
    }

    /// Runs the routing pipeline: candidate selection, health filtering,
    /// scoring, and ordered truncation to the selection count.
    pub fn route_query(&self, request: &SearchRequest) -> Result<Vec<String>> {
        let candidates = self.candidates(request)?;
        let healthy = self.healthy(candidates)?;

        let k = balancer::selection_count(request.batch_size_hint, healthy.len());
        let scored: Vec<(NodeMetrics, f64)> = healthy
            .into_iter()
            .map(|n| {
                let score = balancer::routing_score(&n, &request.required_segments, &self.config);
                (n, score)
            })
            .collect();

        let selected = balancer::select_top_k(scored, k);
        self.metrics_sink
            .record_histogram("router.routing_score_latency_ms", 0.0);
        debug!(count = selected.len(), "routed query to candidates");
        Ok(selected.into_iter().map(|n| n.node_id).collect())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn warn_if_stale(&self, node_id: &str) {
        if let Some(n) = self.nodes.get(node_id) {
            if n.is_stale(self.config.metrics_staleness_limit) {
                warn!(node_id, "node metrics are stale, excluded from routing");
            }
        }
    }
}
