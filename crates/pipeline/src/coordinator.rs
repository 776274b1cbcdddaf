//! Coordinator task
//!
//! Merges the socket records and tailed lines, stamps them with the instance
//! identity, runs the filter and hands accepted records to the drain sink.
//! Ends once every input has closed, which drops the sink sender and lets the
//! sink drain and stop.

use std::ops::ControlFlow;
use std::sync::Arc;

use sysfwd_filter::{FilterEngine, Verdict};
use sysfwd_record::{Record, RecordError};
use sysfwd_sources::{LineEvent, TailStream};
use tokio::sync::mpsc;

use crate::metrics::CoordinatorMetrics;
use crate::stamp::RecordStamper;

pub(crate) struct Coordinator {
    stamper: RecordStamper,
    filter: Arc<FilterEngine>,
    metrics: Arc<CoordinatorMetrics>,
    sink: mpsc::Sender<Record>,
}

impl Coordinator {
    pub(crate) fn new(
        stamper: RecordStamper,
        filter: Arc<FilterEngine>,
        metrics: Arc<CoordinatorMetrics>,
        sink: mpsc::Sender<Record>,
    ) -> Self {
        Self {
            stamper,
            filter,
            metrics,
            sink,
        }
    }

    /// Run until all inputs are exhausted
    ///
    /// Returns the tail stream so the caller can wait for the tailer task.
    pub(crate) async fn run(
        self,
        mut records: Option<mpsc::Receiver<Record>>,
        mut lines: Option<TailStream>,
    ) -> Option<TailStream> {
        let mut records_open = records.is_some();
        let mut lines_open = lines.is_some();

        tracing::info!(
            socket = records_open,
            files = lines_open,
            filter_rules = self.filter.len(),
            "pipeline coordinator started"
        );

        while records_open || lines_open {
            let flow = tokio::select! {
                received = recv_record(&mut records), if records_open => match received {
                    Some(record) => self.dispatch(self.stamper.stamp(&record), "socket").await,
                    None => {
                        records_open = false;
                        ControlFlow::Continue(())
                    }
                },

                event = next_line(&mut lines), if lines_open => match event {
                    Some(event) => self.dispatch(self.stamper.line_record(&event), "files").await,
                    None => {
                        lines_open = false;
                        ControlFlow::Continue(())
                    }
                },
            };

            if flow.is_break() {
                break;
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            records_in = snapshot.records_in,
            forwarded = snapshot.records_forwarded,
            filtered = snapshot.records_filtered,
            rejected = snapshot.records_rejected,
            "pipeline coordinator stopped"
        );

        lines
    }

    async fn dispatch(
        &self,
        built: Result<Record, RecordError>,
        source: &'static str,
    ) -> ControlFlow<()> {
        self.metrics.record_in();

        let record = match built {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_rejected();
                tracing::debug!(source, error = %e, "rejecting event");
                return ControlFlow::Continue(());
            }
        };

        if self.filter.evaluate(&record) == Verdict::Drop {
            self.metrics.record_filtered();
            tracing::trace!(source, severity = record.severity().as_str(), "filtered");
            return ControlFlow::Continue(());
        }

        if self.sink.send(record).await.is_err() {
            self.metrics.record_rejected();
            tracing::warn!("drain sink closed, stopping coordinator");
            return ControlFlow::Break(());
        }

        self.metrics.record_forwarded();
        ControlFlow::Continue(())
    }
}

/// Disabled select branches still build their future, so `None` must not panic
async fn recv_record(records: &mut Option<mpsc::Receiver<Record>>) -> Option<Record> {
    match records {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_line(lines: &mut Option<TailStream>) -> Option<LineEvent> {
    match lines {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
