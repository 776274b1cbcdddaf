//! Counters for the socket listener and the file tailer

use crate::{Counter, Gauge};

/// Counter block shared between a source task and its handle
#[derive(Debug, Default)]
pub struct SourceMetrics {
    received: Counter,
    bytes: Counter,
    malformed: Counter,
    errors: Counter,
    files: Gauge,
}

impl SourceMetrics {
    pub const fn new() -> Self {
        Self {
            received: Counter::new(),
            bytes: Counter::new(),
            malformed: Counter::new(),
            errors: Counter::new(),
            files: Gauge::new(),
        }
    }

    /// One datagram or line of `bytes` length accepted
    #[inline]
    pub fn record_received(&self, bytes: u64) {
        self.received.inc();
        self.bytes.add(bytes);
    }

    /// Input that could not be decoded and was discarded
    #[inline]
    pub fn record_malformed(&self) {
        self.malformed.inc();
    }

    #[inline]
    pub fn record_error(&self) {
        self.errors.inc();
    }

    #[inline]
    pub fn set_files_watched(&self, count: u64) {
        self.files.set(count);
    }

    pub fn snapshot(&self) -> SourceMetricsSnapshot {
        SourceMetricsSnapshot {
            messages_received: self.received.get(),
            bytes_received: self.bytes.get(),
            messages_malformed: self.malformed.get(),
            errors: self.errors.get(),
            files_watched: self.files.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SourceMetricsSnapshot {
    pub messages_received: u64,
    pub bytes_received: u64,
    pub messages_malformed: u64,
    pub errors: u64,
    /// Always zero for the socket listener
    pub files_watched: u64,
}

/// Read access to a source's counters
pub trait SourceMetricsProvider: Send + Sync {
    /// Stable name, e.g. `unix_socket`, `udp_socket`, `files`
    fn source_id(&self) -> &str;

    fn source_type(&self) -> &str;

    fn snapshot(&self) -> SourceMetricsSnapshot;
}
