//! Control-plane intelligence layer for a distributed vector-search
//! database: adaptive query routing, tiered-storage management, feedback
//! driven parameter tuning, and hybrid query planning.
//!
//! Every subsystem below owns its own state exclusively, communicates
//! outward only through its published decisions, and communicates inward
//! only through pushed observations. None persists across a restart.

pub mod autotuner;
pub mod error;
pub mod hybrid;
pub mod metrics;
pub mod router;
pub mod tiering;

pub use error::{CoreError, Result};
pub use metrics::{MetricsSink, NoopMetricsSink};
