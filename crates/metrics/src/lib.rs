//! sysfwd - Metrics
//!
//! Counters kept by every stage of the forwarder and a reporter that
//! periodically writes them to the agent's own log output.
//!
//! Each component owns an `Arc` of its counter block and hands out a cheap
//! handle implementing one of the provider traits ([`SourceMetricsProvider`],
//! [`DrainMetricsProvider`], [`PipelineMetricsProvider`]). Handles outlive
//! the task that consumed the component, so totals can still be read during
//! and after shutdown.
//!
//! Reports never go to a file of their own: they are `tracing` events and
//! follow the `[log]` destination.

mod collected;
mod drain;
pub mod format;
mod loss;
mod pipeline;
mod reporter;
mod source;

pub use collected::{
    CollectedDrain, CollectedMetrics, CollectedSource, DrainRates, MetricsRates, PipelineRates,
    SourceRates,
};
pub use drain::{DrainMetrics, DrainMetricsProvider, DrainMetricsSnapshot};
pub use format::{HumanFormatter, JsonFormatter, MetricsFormatter};
pub use loss::{Loss, LossKind};
pub use pipeline::{PipelineMetricsProvider, PipelineSnapshot};
pub use reporter::{MetricsReporter, MetricsReporterBuilder};
pub use source::{SourceMetrics, SourceMetricsProvider, SourceMetricsSnapshot};

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic event counter
///
/// Relaxed ordering: values are only ever read for reporting.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Last-write-wins level, e.g. number of files being tailed
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn set(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
