//! Transport configuration
//!
//! Runtime form of the `[drain]` section. Immutable once the sink starts;
//! shared read-only between the transport and its metrics handle.

use std::time::Duration;
use sysfwd_config::{DrainConfig, Framing, MAX_UDP_PAYLOAD, TransportProtocol};

/// Configuration for a drain transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Drain address (host:port)
    pub address: String,

    /// udp or tcp
    pub protocol: TransportProtocol,

    /// Stream framing (tcp only)
    pub framing: Framing,

    /// Connection timeout
    pub connection_timeout: Duration,

    /// Write timeout per record
    pub write_timeout: Duration,

    /// Retries after the first failed attempt
    pub retry_attempts: u32,

    /// First retry wait, doubled on each further retry
    pub retry_interval: Duration,

    /// Cap for the retry wait
    pub max_backoff: Duration,

    /// Practical datagram ceiling (udp only)
    pub max_datagram_size: usize,

    /// TCP keep-alive enabled
    pub tcp_keepalive: bool,

    /// TCP keep-alive interval (only used if tcp_keepalive is true)
    pub tcp_keepalive_interval: Duration,
}

impl TransportConfig {
    /// Create a config for `address` with default timeouts and retry policy
    pub fn new(address: impl Into<String>, protocol: TransportProtocol) -> Self {
        Self {
            address: address.into(),
            protocol,
            framing: Framing::OctetCounting,
            connection_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
            retry_attempts: 5,
            retry_interval: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            max_datagram_size: MAX_UDP_PAYLOAD,
            tcp_keepalive: true,
            tcp_keepalive_interval: Duration::from_secs(30),
        }
    }

    /// Set the TCP framing mode
    #[must_use]
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set connection timeout
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set retry attempts
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the initial retry wait
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the retry wait cap
    #[must_use]
    pub fn with_max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    /// Set the datagram ceiling
    #[must_use]
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    /// Wait before retry number `retry` (0-based)
    ///
    /// `retry_interval * 2^retry`, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.retry_interval
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl From<&DrainConfig> for TransportConfig {
    fn from(drain: &DrainConfig) -> Self {
        Self {
            address: drain.address.clone(),
            protocol: drain.transport,
            framing: drain.framing,
            connection_timeout: drain.connection_timeout,
            write_timeout: drain.write_timeout,
            retry_attempts: drain.retry_attempts,
            retry_interval: drain.retry_interval,
            max_backoff: drain.max_backoff,
            max_datagram_size: drain.max_datagram_size,
            ..Self::new(String::new(), drain.transport)
        }
    }
}
