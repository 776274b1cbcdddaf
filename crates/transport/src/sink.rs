//! Drain sink worker
//!
//! Consumes accepted records from the pipeline channel and hands them to the
//! [`DrainTransport`] one at a time. Records that cannot be delivered after
//! all retries are dropped and counted; the sink never stops on send errors.
//!
//! # Example
//!
//! ```ignore
//! let (tx, rx) = mpsc::channel(4096);
//! let sink = DrainSink::new(DrainTransport::new(config), rx);
//! let handle = sink.metrics_handle();
//! tokio::spawn(sink.run());
//! ```

use std::sync::Arc;

use sysfwd_metrics::{DrainMetrics, DrainMetricsProvider, DrainMetricsSnapshot};
use sysfwd_record::Record;
use tokio::sync::mpsc;

use crate::DrainTransport;

/// Handle for accessing drain metrics
///
/// Holds an Arc to the metrics, so it remains valid even after the sink
/// is consumed by `run()`.
#[derive(Clone)]
pub struct DrainMetricsHandle {
    id: String,
    transport: &'static str,
    metrics: Arc<DrainMetrics>,
}

impl DrainMetricsProvider for DrainMetricsHandle {
    fn drain_id(&self) -> &str {
        &self.id
    }

    fn transport(&self) -> &str {
        self.transport
    }

    fn snapshot(&self) -> DrainMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Worker that owns the drain transport
pub struct DrainSink {
    receiver: mpsc::Receiver<Record>,
    transport: DrainTransport,
}

impl DrainSink {
    /// Create a sink reading from `receiver`
    pub fn new(transport: DrainTransport, receiver: mpsc::Receiver<Record>) -> Self {
        Self {
            receiver,
            transport,
        }
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> DrainMetricsHandle {
        let config = self.transport.config();
        DrainMetricsHandle {
            id: config.address.clone(),
            transport: config.protocol.as_str(),
            metrics: Arc::clone(self.transport.metrics()),
        }
    }

    /// Run until the channel is closed and drained
    pub async fn run(mut self) -> DrainMetricsSnapshot {
        let address = self.transport.config().address.clone();
        let protocol = self.transport.config().protocol.as_str();

        tracing::info!(drain = %address, transport = protocol, "drain sink starting");

        if let Err(e) = self.transport.connect().await {
            tracing::warn!(
                drain = %address,
                error = %e,
                "initial connection failed, will retry on first record"
            );
        }

        while let Some(record) = self.receiver.recv().await {
            self.transport.metrics().record_received();

            if let Err(e) = self.transport.send(&record).await {
                self.transport.metrics().record_dropped();
                tracing::warn!(
                    drain = %address,
                    error = %e,
                    message_len = record.message().len(),
                    "dropping record"
                );
            }
        }

        self.transport.close().await;

        let snapshot = self.transport.metrics().snapshot();
        tracing::info!(
            drain = %address,
            records_received = snapshot.records_received,
            records_sent = snapshot.records_sent,
            records_dropped = snapshot.records_dropped,
            bytes_sent = snapshot.bytes_sent,
            retries = snapshot.retries,
            "drain sink shutting down"
        );

        snapshot
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
