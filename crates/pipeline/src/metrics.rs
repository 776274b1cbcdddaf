//! Coordinator metrics
//!
//! Relaxed atomic counters, eventually consistent. Every event taken from a
//! source ends in exactly one of forwarded, filtered or rejected, so
//! `records_in` equals their sum once the coordinator is idle.

use std::sync::Arc;

use sysfwd_metrics::{Counter, PipelineMetricsProvider, PipelineSnapshot};

/// Counters for the pipeline coordinator
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    records_in: Counter,
    records_forwarded: Counter,
    records_filtered: Counter,
    records_rejected: Counter,
}

impl CoordinatorMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            records_in: Counter::new(),
            records_forwarded: Counter::new(),
            records_filtered: Counter::new(),
            records_rejected: Counter::new(),
        }
    }

    /// An event was taken from a source
    #[inline]
    pub fn record_in(&self) {
        self.records_in.inc();
    }

    /// A record was accepted by the drain channel
    #[inline]
    pub fn record_forwarded(&self) {
        self.records_forwarded.inc();
    }

    /// A record was dropped by the filter
    #[inline]
    pub fn record_filtered(&self) {
        self.records_filtered.inc();
    }

    /// An event could not be turned into a record, or the drain was gone
    #[inline]
    pub fn record_rejected(&self) {
        self.records_rejected.inc();
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            records_in: self.records_in.get(),
            records_forwarded: self.records_forwarded.get(),
            records_filtered: self.records_filtered.get(),
            records_rejected: self.records_rejected.get(),
        }
    }
}

/// Handle for accessing coordinator metrics
///
/// Holds an Arc to the metrics, so it remains valid after the pipeline has
/// been started or shut down.
#[derive(Clone)]
pub struct PipelineMetricsHandle {
    metrics: Arc<CoordinatorMetrics>,
}

impl PipelineMetricsHandle {
    pub(crate) fn new(metrics: Arc<CoordinatorMetrics>) -> Self {
        Self { metrics }
    }
}

impl PipelineMetricsProvider for PipelineMetricsHandle {
    fn pipeline_snapshot(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = Arc::new(CoordinatorMetrics::new());
        for _ in 0..3 {
            metrics.record_in();
        }
        metrics.record_forwarded();
        metrics.record_filtered();
        metrics.record_rejected();

        let handle = PipelineMetricsHandle::new(Arc::clone(&metrics));
        let snapshot = handle.pipeline_snapshot();
        assert_eq!(snapshot.records_in, 3);
        assert_eq!(snapshot.records_forwarded, 1);
        assert_eq!(snapshot.records_filtered, 1);
        assert_eq!(snapshot.records_rejected, 1);
    }
}
