//! Line-per-component text reports
//!
//! ```text
//! [metrics] pipeline: in 12.3K (20/s) | forwarded 12.1K (19/s) | filtered 200 | rejected 0
//! [metrics] sources: unix_socket (4.1K, 5/s) | files (8.2K, 15/s, 3 files)
//! [metrics] drain: tcp logs.example.com:514 (sent 12.1K, 19/s, 2.1 KB/s, 0 retries, 0 dropped)
//! ```

use super::{MetricsFormatter, bytes_per_sec, count, per_sec};
use crate::{CollectedDrain, CollectedMetrics, CollectedSource, MetricsRates, PipelineSnapshot};
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        Self
    }
}

fn pipeline_line(pipeline: &PipelineSnapshot, rates: Option<&MetricsRates>) -> String {
    let rate = rates.and_then(|r| r.pipeline);
    let mut line = format!("[metrics] pipeline: in {}", count(pipeline.records_in));
    if let Some(r) = rate {
        let _ = write!(line, " ({})", per_sec(r.records_in_per_sec));
    }
    let _ = write!(line, " | forwarded {}", count(pipeline.records_forwarded));
    if let Some(r) = rate {
        let _ = write!(line, " ({})", per_sec(r.forwarded_per_sec));
    }
    let _ = write!(
        line,
        " | filtered {} | rejected {}",
        count(pipeline.records_filtered),
        count(pipeline.records_rejected)
    );
    line
}

fn source_part(source: &CollectedSource, rates: Option<&MetricsRates>) -> String {
    let totals = &source.snapshot;
    let mut details = vec![count(totals.messages_received)];
    if let Some(r) = rates.and_then(|r| r.source(&source.id)) {
        details.push(per_sec(r.messages_per_sec));
    }
    if source.source_type == "files" {
        details.push(format!("{} files", totals.files_watched));
    }
    if totals.messages_malformed > 0 {
        details.push(format!("{} malformed", totals.messages_malformed));
    }
    if totals.errors > 0 {
        details.push(format!("{} err", totals.errors));
    }
    format!("{} ({})", source.id, details.join(", "))
}

fn drain_line(drain: &CollectedDrain, rates: Option<&MetricsRates>) -> String {
    let totals = &drain.snapshot;
    let mut details = vec![format!("sent {}", count(totals.records_sent))];
    if let Some(r) = rates.and_then(|r| r.drain(&drain.id)) {
        details.push(per_sec(r.records_per_sec));
        details.push(bytes_per_sec(r.bytes_per_sec));
    }
    details.push(format!("{} retries", totals.retries));
    details.push(format!("{} dropped", totals.records_dropped));
    if totals.in_flight() > 0 {
        details.push(format!("{} in flight", totals.in_flight()));
    }
    format!(
        "[metrics] drain: {} {} ({})",
        drain.transport,
        drain.id,
        details.join(", ")
    )
}

impl MetricsFormatter for HumanFormatter {
    fn format(&self, metrics: &CollectedMetrics, rates: Option<&MetricsRates>) -> String {
        let mut lines = Vec::new();
        if let Some(pipeline) = &metrics.pipeline {
            lines.push(pipeline_line(pipeline, rates));
        }
        if !metrics.sources.is_empty() {
            let parts: Vec<_> = metrics
                .sources
                .iter()
                .map(|s| source_part(s, rates))
                .collect();
            lines.push(format!("[metrics] sources: {}", parts.join(" | ")));
        }
        lines.extend(metrics.drains.iter().map(|d| drain_line(d, rates)));
        lines.join("\n")
    }
}
