//! Adaptive Query Router: real-time, metric-driven node selection for
//! search requests.

mod balancer;
mod router;
mod types;

pub use balancer::{best_single_node, health_score, routing_score, NO_NODE};
pub use router::AdaptiveRouter;
pub use types::{NodeMetrics, NodeMetricsInput, RouterConfig, SearchRequest};
