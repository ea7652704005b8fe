//! Emission seam for the named measurements the four subsystems produce.
//!
//! The concrete counter/gauge/histogram transport is an external
//! collaborator: this crate only needs somewhere to push named measurements
//! to. [`NoopMetricsSink`] is the default used by tests
//! and by any subsystem constructed without an explicit sink; a real binary
//! wires in its own exporter by implementing [`MetricsSink`].

use std::fmt;

/// Receives named measurements emitted by the control plane.
///
/// Implementors are expected to be cheap to call from a hot path (scoring,
/// migration bookkeeping) — no blocking I/O should happen inline.
pub trait MetricsSink: Send + Sync + fmt::Debug {
    fn record_counter(&self, name: &str, value: u64) {
        let _ = (name, value);
    }

    fn record_gauge(&self, name: &str, value: f64) {
        let _ = (name, value);
    }

    fn record_histogram(&self, name: &str, value: f64) {
        let _ = (name, value);
    }
}

/// Default sink: drops all measurements. Decision points still log via
/// `tracing` independently of whatever sink is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {}
