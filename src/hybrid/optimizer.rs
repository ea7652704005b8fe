//! Hybrid Optimizer: chooses an execution plan tag for a vector + scalar
//! predicate query from estimated selectivity.

use super::selectivity::estimate;
use super::stats_cache::StatsCache;
use super::types::{HybridRequest, OptimizationConfig, Plan, PlanType};

pub struct HybridOptimizer {
    config: OptimizationConfig,
    stats_cache: StatsCache,
}

impl HybridOptimizer {
    pub fn new(config: OptimizationConfig) -> Self {
        Self {
            config,
            stats_cache: StatsCache::new(),
        }
    }

    pub fn stats_cache(&self) -> &StatsCache {
        &self.stats_cache
    }

    pub fn optimize_plan(&self, request: &HybridRequest) -> Plan {
        if request.is_empty_predicate() {
            return self.plan_for(PlanType::SearchThenFilter, 1.0, request);
        }

        let stats = self.stats_cache.get(&request.collection);
        let selectivity = estimate(&request.predicate_blob, request.predicate.as_ref(), stats.as_ref());

        let plan_type = if selectivity < self.config.highly_selective_threshold {
            PlanType::FilterThenSearch
        } else if selectivity > self.config.broad_filter_threshold {
            PlanType::SearchThenFilter
        } else if self.config.parallel_execution_enabled {
            PlanType::ParallelHybrid
        } else {
            PlanType::FilterThenSearch
        };

        self.plan_for(plan_type, selectivity, request)
    }

    fn plan_for(&self, plan_type: PlanType, selectivity: f64, request: &HybridRequest) -> Plan {
        let segment_count = (request.sealed_segments.len() + request.growing_segments.len()) as f64;
        let k = match plan_type {
            PlanType::FilterThenSearch => 1.0,
            PlanType::SearchThenFilter => 1.2,
            PlanType::ParallelHybrid => 0.8,
        };
        Plan {
            plan_type,
            estimated_selectivity: selectivity,
            advisory_cost: segment_count * k,
        }
    }
}

impl Default for HybridOptimizer {
    fn default() -> Self {
        Self::new(OptimizationConfig::default())
    }
}
