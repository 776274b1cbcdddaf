//! Point-in-time collections and the per-interval rates between two of them

use crate::{DrainMetricsSnapshot, PipelineSnapshot, SourceMetricsSnapshot};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct CollectedSource {
    pub id: String,
    pub source_type: String,
    pub snapshot: SourceMetricsSnapshot,
}

#[derive(Debug, Clone)]
pub struct CollectedDrain {
    /// `host:port`
    pub id: String,
    pub transport: String,
    pub snapshot: DrainMetricsSnapshot,
}

/// Totals of every registered component at one instant
#[derive(Debug, Clone, Default)]
pub struct CollectedMetrics {
    /// Unset for hand-built collections; rates need it on both sides
    pub timestamp: Option<Instant>,
    pub pipeline: Option<PipelineSnapshot>,
    pub sources: Vec<CollectedSource>,
    pub drains: Vec<CollectedDrain>,
}

impl CollectedMetrics {
    pub fn new() -> Self {
        Self {
            timestamp: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn source(&self, id: &str) -> Option<&CollectedSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn drain(&self, id: &str) -> Option<&CollectedDrain> {
        self.drains.iter().find(|d| d.id == id)
    }

    /// Activity between `earlier` and `self`
    ///
    /// `None` without two timestamps at least one tick apart. Components
    /// missing from `earlier` get no rate entry.
    pub fn rates(&self, earlier: &CollectedMetrics) -> Option<MetricsRates> {
        let elapsed = self.timestamp?.checked_duration_since(earlier.timestamp?)?;
        if elapsed.is_zero() {
            return None;
        }
        let window = Window {
            secs: elapsed.as_secs_f64(),
        };

        let pipeline = self
            .pipeline
            .zip(earlier.pipeline)
            .map(|(now, then)| PipelineRates {
                records_in_per_sec: window.rate(now.records_in, then.records_in),
                forwarded_per_sec: window.rate(now.records_forwarded, then.records_forwarded),
                filtered: now.records_filtered.saturating_sub(then.records_filtered),
                rejected: now.records_rejected.saturating_sub(then.records_rejected),
            });

        let sources = self
            .sources
            .iter()
            .filter_map(|now| {
                let then = &earlier.source(&now.id)?.snapshot;
                let now_s = &now.snapshot;
                Some(SourceRates {
                    id: now.id.clone(),
                    messages_per_sec: window.rate(now_s.messages_received, then.messages_received),
                    malformed: now_s.messages_malformed.saturating_sub(then.messages_malformed),
                    errors: now_s.errors.saturating_sub(then.errors),
                })
            })
            .collect();

        let drains = self
            .drains
            .iter()
            .filter_map(|now| {
                let then = &earlier.drain(&now.id)?.snapshot;
                let now_d = &now.snapshot;
                Some(DrainRates {
                    id: now.id.clone(),
                    records_per_sec: window.rate(now_d.records_sent, then.records_sent),
                    bytes_per_sec: window.rate(now_d.bytes_sent, then.bytes_sent),
                    retries: now_d.retries.saturating_sub(then.retries),
                    dropped: now_d.records_dropped.saturating_sub(then.records_dropped),
                })
            })
            .collect();

        Some(MetricsRates {
            pipeline,
            sources,
            drains,
        })
    }
}

struct Window {
    secs: f64,
}

impl Window {
    fn rate(&self, now: u64, then: u64) -> f64 {
        now.saturating_sub(then) as f64 / self.secs
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsRates {
    pub pipeline: Option<PipelineRates>,
    pub sources: Vec<SourceRates>,
    pub drains: Vec<DrainRates>,
}

impl MetricsRates {
    pub fn source(&self, id: &str) -> Option<&SourceRates> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn drain(&self, id: &str) -> Option<&DrainRates> {
        self.drains.iter().find(|d| d.id == id)
    }
}

/// Per-second throughput plus interval counts for the rarer events
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineRates {
    pub records_in_per_sec: f64,
    pub forwarded_per_sec: f64,
    pub filtered: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SourceRates {
    pub id: String,
    pub messages_per_sec: f64,
    pub malformed: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DrainRates {
    pub id: String,
    pub records_per_sec: f64,
    pub bytes_per_sec: f64,
    pub retries: u64,
    pub dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(instant: Instant, lines: u64, sent: u64, dropped: u64) -> CollectedMetrics {
        CollectedMetrics {
            timestamp: Some(instant),
            pipeline: Some(PipelineSnapshot {
                records_in: lines,
                records_forwarded: sent,
                ..Default::default()
            }),
            sources: vec![CollectedSource {
                id: "files".into(),
                source_type: "files".into(),
                snapshot: SourceMetricsSnapshot {
                    messages_received: lines,
                    ..Default::default()
                },
            }],
            drains: vec![CollectedDrain {
                id: "10.0.0.5:6067".into(),
                transport: "tcp".into(),
                snapshot: DrainMetricsSnapshot {
                    records_sent: sent,
                    bytes_sent: sent * 250,
                    records_dropped: dropped,
                    ..Default::default()
                },
            }],
        }
    }

    #[test]
    fn test_rates_over_four_seconds() {
        let t0 = Instant::now();
        let before = at(t0, 0, 0, 0);
        let after = at(t0 + Duration::from_secs(4), 400, 380, 20);

        let rates = after.rates(&before).unwrap();
        assert_eq!(rates.pipeline.unwrap().records_in_per_sec, 100.0);
        assert_eq!(rates.source("files").unwrap().messages_per_sec, 100.0);

        let drain = rates.drain("10.0.0.5:6067").unwrap();
        assert_eq!(drain.records_per_sec, 95.0);
        assert_eq!(drain.bytes_per_sec, 23_750.0);
        assert_eq!(drain.dropped, 20);
    }

    #[test]
    fn test_no_rates_without_elapsed_time() {
        let t0 = Instant::now();
        let snapshot = at(t0, 1, 1, 0);
        assert!(snapshot.rates(&snapshot).is_none());
        assert!(snapshot.rates(&CollectedMetrics::default()).is_none());

        let later = at(t0 + Duration::from_secs(1), 1, 1, 0);
        assert!(snapshot.rates(&later).is_none());
    }

    #[test]
    fn test_component_missing_from_earlier_has_no_rate() {
        let t0 = Instant::now();
        let mut before = at(t0, 0, 0, 0);
        before.sources.clear();
        let after = at(t0 + Duration::from_secs(1), 10, 10, 0);

        let rates = after.rates(&before).unwrap();
        assert!(rates.source("files").is_none());
        assert!(rates.drain("10.0.0.5:6067").is_some());
    }
}
