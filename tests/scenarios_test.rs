//! Cross-module scenario tests driven entirely through each subsystem's
//! public surface rather than internal helpers, exercising whole
//! subsystems end to end.

use control_plane::autotuner::{AutoTuner, ParameterValue, PerformanceTarget, QueryMetrics, TuningAction};
use control_plane::hybrid::{
    CollectionStatistics, HybridOptimizer, HybridRequest, OptimizationConfig, PlanType,
};
use control_plane::router::{AdaptiveRouter, NodeMetricsInput, RouterConfig, SearchRequest};
use control_plane::tiering::{Tier, TierBackend, TierManager, TieringPolicy};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

fn node_input(cpu: f64, mem: f64, cache: f64, p95: f64, local: &[&str]) -> NodeMetricsInput {
    NodeMetricsInput {
        cpu_usage: cpu,
        memory_usage: mem,
        cache_hit_rate: cache,
        p95_latency_ms: Some(p95),
        p99_latency_ms: Some(p95 * 1.5),
        qps: 50.0,
        active_queries: 2,
        local_segments: local.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn scenario_router_prefers_cache_locality_and_health() {
    let router = AdaptiveRouter::new(RouterConfig::default());
    router.update_node_metrics("1", node_input(0.3, 0.4, 0.9, 15.0, &["100"]));
    router.update_node_metrics("2", node_input(0.4, 0.5, 0.7, 25.0, &["101"]));
    router.update_node_metrics("3", node_input(0.95, 0.9, 0.5, 50.0, &["100", "101"]));

    let request = SearchRequest {
        required_segments: vec!["100".to_string()],
        batch_size_hint: 5,
    };
    let selected = router.route_query(&request).expect("routing should succeed");

    assert_eq!(selected, vec!["1".to_string()]);
    assert!(!selected.contains(&"3".to_string()), "node 3 must be excluded on health");
}

#[test]
fn scenario_migration_priority_promotion_outranks_demotion() {
    // Priority ordering is asserted directly via the published formula:
    // any promotion must strictly outrank any same-age demotion.
    let promotion_priority = control_plane::tiering::migration_priority(Tier::Warm, Tier::Hot);
    let demotion_priority = control_plane::tiering::migration_priority(Tier::Hot, Tier::Warm);
    assert!(promotion_priority > demotion_priority);
}

#[test]
fn scenario_access_tracker_round_trip_via_tier_manager() {
    let manager = TierManager::new(TieringPolicy::default(), 1_000_000, 1_000_000, 1_000_000);
    manager.record_access("seg-a", 4096, 3.0);
    manager.record_access("seg-a", 4096, 9.0);

    // Newly observed segment defaults to Cold until a migration lands it
    // elsewhere.
    assert_eq!(manager.get_segment_tier("seg-a"), Tier::Cold);
}

#[tokio::test]
async fn scenario_migration_moves_segment_and_stamps_current_tier() {
    let manager = TierManager::new(TieringPolicy::default(), 1_000_000, 1_000_000, 1_000_000);
    manager.tier_backend(Tier::Cold).load("seg1", 128).unwrap();

    // `current_tier` defaults to Cold until observed otherwise, matching
    // where the segment was actually loaded here.
    assert_eq!(manager.get_segment_tier("seg1"), Tier::Cold);

    manager.migrate_segment("seg1", Tier::Hot).unwrap();
    let outcomes = manager.dispatch_migrations().await;

    assert_eq!(outcomes, vec![("seg1".to_string(), Tier::Hot, control_plane::tiering::MigrationStatus::Completed)]);
    assert!(manager.tier_backend(Tier::Hot).has("seg1"));
    assert!(!manager.tier_backend(Tier::Cold).has("seg1"));
    assert_eq!(manager.get_segment_tier("seg1"), Tier::Hot);
}

#[test]
fn scenario_decision_low_recall_on_hnsw_end_to_end() {
    let tuner = AutoTuner::new();
    tuner.set_performance_target(
        "coll-1",
        PerformanceTarget {
            target_p95_latency_ms: 200.0,
            latency_tolerance: 1.2,
            target_recall: 0.95,
            recall_tolerance: 0.95,
            memory_budget_bytes: 100 * 1024 * 1024 * 1024,
            memory_tolerance: 0.9,
        },
    );

    for _ in 0..150 {
        let mut search_params = HashMap::new();
        search_params.insert("ef".to_string(), ParameterValue::Integer(64));
        tuner.record_query_metrics(QueryMetrics {
            collection: "coll-1".to_string(),
            index_type: "HNSW".to_string(),
            latency_ms: 20.0,
            recall: 0.85,
            memory_bytes: 1_000_000,
            cpu_usage: 0.3,
            search_params,
            index_params: HashMap::new(),
            timestamp: Utc::now(),
        });
    }

    assert!(tuner.check(), "first check should always run");
    let suggestion = tuner.get_suggestion("coll-1").expect("a suggestion should be emitted");
    assert_eq!(suggestion.action, TuningAction::IncreaseEf);
    assert_eq!(suggestion.suggested_value, 96);
    assert!(!suggestion.rebuild_required);
    assert!(suggestion.expected_recall_change > 0.0);
    assert!((suggestion.confidence - 0.80).abs() < 1e-9);
}

#[test]
fn scenario_decision_high_memory_on_hnsw_requires_rebuild() {
    let tuner = AutoTuner::new();
    for _ in 0..150 {
        let mut index_params = HashMap::new();
        index_params.insert("M".to_string(), ParameterValue::Integer(16));
        tuner.record_query_metrics(QueryMetrics {
            collection: "coll-2".to_string(),
            index_type: "HNSW".to_string(),
            latency_ms: 5.0,
            recall: 0.99,
            memory_bytes: 95 * 1024 * 1024 * 1024 / 10, // 9.5 GiB, over the 9 GiB (10 GiB * 0.9) ceiling
            cpu_usage: 0.2,
            search_params: HashMap::new(),
            index_params,
            timestamp: Utc::now(),
        });
    }

    assert!(tuner.check());
    let suggestion = tuner.get_suggestion("coll-2").expect("a suggestion should be emitted");
    assert_eq!(suggestion.action, TuningAction::RebuildSmallerM);
    assert_eq!(suggestion.suggested_value, 12);
    assert!(suggestion.rebuild_required);
    assert!((suggestion.expected_memory_change + 0.25).abs() < 1e-9);
    assert!((suggestion.confidence - 0.70).abs() < 1e-9);
}

#[test]
fn scenario_hybrid_plan_selection_across_blob_lengths() {
    let optimizer = HybridOptimizer::new(OptimizationConfig::default());
    optimizer.stats_cache().update(CollectionStatistics {
        collection: "coll-3".to_string(),
        total_rows: 10_000,
        fields: HashMap::new(),
        last_updated: Utc::now(),
    });

    let request = |len: usize| HybridRequest {
        collection: "coll-3".to_string(),
        predicate_blob: vec![0u8; len],
        predicate: None,
        sealed_segments: HashSet::from(["s1".to_string()]),
        growing_segments: HashSet::from(["g1".to_string()]),
    };

    assert_eq!(optimizer.optimize_plan(&request(30)).plan_type, PlanType::FilterThenSearch);
    assert_eq!(optimizer.optimize_plan(&request(150)).plan_type, PlanType::ParallelHybrid);
    assert_eq!(optimizer.optimize_plan(&request(500)).plan_type, PlanType::SearchThenFilter);
    assert_eq!(optimizer.optimize_plan(&request(0)).plan_type, PlanType::SearchThenFilter);
}

#[tokio::test]
async fn scenario_tier_manager_background_loop_drains_on_shutdown() {
    use std::sync::Arc;

    let manager = Arc::new(TierManager::new(TieringPolicy::default(), 1000, 1000, 1000));
    let (tx, rx) = tokio::sync::watch::channel(false);

    let handle = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.run(rx).await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    tx.send(true).expect("shutdown signal should send");
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("background loop should stop promptly after shutdown")
        .expect("loop task should not panic");
}
