// Adaptive Router benchmarks: per-request scoring and route selection
// under a growing fleet of candidate nodes.

use control_plane::router::{AdaptiveRouter, NodeMetricsInput, RouterConfig, SearchRequest};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashSet;

fn populated_router(node_count: usize) -> AdaptiveRouter {
    let router = AdaptiveRouter::new(RouterConfig::default());
    for i in 0..node_count {
        let mut local_segments = HashSet::new();
        local_segments.insert(format!("segment-{}", i % 32));
        router.update_node_metrics(
            &i.to_string(),
            NodeMetricsInput {
                cpu_usage: 0.2 + (i as f64 % 10.0) / 20.0,
                memory_usage: 0.3,
                cache_hit_rate: 0.8,
                p95_latency_ms: Some(12.0),
                p99_latency_ms: Some(20.0),
                qps: 100.0,
                active_queries: 4,
                local_segments,
            },
        );
    }
    router
}

fn bench_route_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("router_route_query");
    for node_count in [10usize, 100, 1_000] {
        let router = populated_router(node_count);
        let request = SearchRequest {
            required_segments: vec!["segment-5".to_string()],
            batch_size_hint: 8,
        };
        group.bench_with_input(BenchmarkId::from_parameter(node_count), &node_count, |b, _| {
            b.iter(|| black_box(router.route_query(black_box(&request))))
        });
    }
    group.finish();
}

fn bench_update_node_metrics(c: &mut Criterion) {
    let router = populated_router(1_000);
    c.bench_function("router_update_node_metrics", |b| {
        b.iter(|| {
            router.update_node_metrics(
                "500",
                NodeMetricsInput {
                    cpu_usage: 0.4,
                    memory_usage: 0.4,
                    cache_hit_rate: 0.9,
                    p95_latency_ms: Some(10.0),
                    p99_latency_ms: Some(15.0),
                    qps: 150.0,
                    active_queries: 2,
                    local_segments: HashSet::from(["segment-1".to_string()]),
                },
            )
        })
    });
}

criterion_group!(benches, bench_route_query, bench_update_node_metrics);
criterion_main!(benches);
