//! Coordinator totals

/// What the coordinator did with the records it took from the sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PipelineSnapshot {
    pub records_in: u64,
    pub records_forwarded: u64,
    /// Matched a drop rule
    pub records_filtered: u64,
    /// Could not be handed to the drain sink
    pub records_rejected: u64,
}

/// Read access to the coordinator's counters
pub trait PipelineMetricsProvider: Send + Sync {
    fn pipeline_snapshot(&self) -> PipelineSnapshot;
}
