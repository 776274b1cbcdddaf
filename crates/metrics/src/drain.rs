//! Counters for the drain sink

use crate::Counter;

/// Delivery counters for the remote drain
///
/// Every record taken from the pipeline ends up counted as either sent or
/// dropped; `send_errors` and `retries` describe the attempts in between.
#[derive(Debug, Default)]
pub struct DrainMetrics {
    received: Counter,
    sent: Counter,
    bytes: Counter,
    send_errors: Counter,
    retries: Counter,
    dropped: Counter,
    connects: Counter,
}

impl DrainMetrics {
    pub const fn new() -> Self {
        Self {
            received: Counter::new(),
            sent: Counter::new(),
            bytes: Counter::new(),
            send_errors: Counter::new(),
            retries: Counter::new(),
            dropped: Counter::new(),
            connects: Counter::new(),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.received.inc();
    }

    /// Delivered, `bytes` including any octet-count framing
    #[inline]
    pub fn record_sent(&self, bytes: u64) {
        self.sent.inc();
        self.bytes.add(bytes);
    }

    #[inline]
    pub fn record_error(&self) {
        self.send_errors.inc();
    }

    #[inline]
    pub fn record_retry(&self) {
        self.retries.inc();
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.dropped.inc();
    }

    #[inline]
    pub fn record_connect(&self) {
        self.connects.inc();
    }

    pub fn snapshot(&self) -> DrainMetricsSnapshot {
        DrainMetricsSnapshot {
            records_received: self.received.get(),
            records_sent: self.sent.get(),
            bytes_sent: self.bytes.get(),
            send_errors: self.send_errors.get(),
            retries: self.retries.get(),
            records_dropped: self.dropped.get(),
            connects: self.connects.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DrainMetricsSnapshot {
    pub records_received: u64,
    pub records_sent: u64,
    pub bytes_sent: u64,
    pub send_errors: u64,
    pub retries: u64,
    pub records_dropped: u64,
    pub connects: u64,
}

impl DrainMetricsSnapshot {
    /// Records taken but neither sent nor dropped yet
    pub fn in_flight(&self) -> u64 {
        self.records_received
            .saturating_sub(self.records_sent + self.records_dropped)
    }
}

/// Read access to the drain sink's counters
pub trait DrainMetricsProvider: Send + Sync {
    /// The configured `host:port`
    fn drain_id(&self) -> &str;

    /// `udp` or `tcp`
    fn transport(&self) -> &str;

    fn snapshot(&self) -> DrainMetricsSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_then_give_up() {
        let metrics = DrainMetrics::new();
        metrics.record_received();
        metrics.record_error();
        metrics.record_retry();
        metrics.record_error();
        metrics.record_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.send_errors, 2);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.records_dropped, 1);
        assert_eq!(snapshot.records_sent, 0);
        assert_eq!(snapshot.in_flight(), 0);
    }

    #[test]
    fn test_in_flight_counts_pending_records() {
        let metrics = DrainMetrics::new();
        for _ in 0..3 {
            metrics.record_received();
        }
        metrics.record_connect();
        metrics.record_sent(1030);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.in_flight(), 2);
        assert_eq!(snapshot.bytes_sent, 1030);
        assert_eq!(snapshot.connects, 1);
    }
}
