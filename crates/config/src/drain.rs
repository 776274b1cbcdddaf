//! Drain configuration
//!
//! The drain is the remote syslog collector that receives forwarded records.

use serde::Deserialize;
use std::time::Duration;

/// Largest UDP payload over IPv4 (65535 - 8 byte UDP header - 20 byte IP header)
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Network protocol used to reach the drain
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    /// One record per datagram
    Udp,
    /// Framed stream (default)
    #[default]
    Tcp,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

/// How records are delimited on a TCP stream (RFC6587)
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// `MSG-LEN SP SYSLOG-MSG` (default)
    #[default]
    OctetCounting,
    /// Record followed by LF, embedded line breaks escaped
    NonTransparent,
}

/// Drain configuration
///
/// # Example
///
/// ```toml
/// [drain]
/// address = "logs.example.com:514"
/// transport = "tcp"
/// framing = "octet_counting"
/// retry_attempts = 5
/// retry_interval = "500ms"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Collector address (host:port)
    /// Required when forwarding is enabled
    pub address: String,

    /// udp or tcp
    /// Default: tcp
    pub transport: TransportProtocol,

    /// TCP framing mode (ignored for udp)
    /// Default: octet_counting
    pub framing: Framing,

    /// Connection timeout
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Write timeout per record
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,

    /// Number of retries after the first failed send
    /// Default: 5
    pub retry_attempts: u32,

    /// Initial wait between retries, doubled after each failure
    /// Default: 500ms
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,

    /// Upper bound for the retry wait
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,

    /// Largest record sent as a single UDP datagram without a warning
    /// Default: 65507
    pub max_datagram_size: usize,

    /// Fail startup when the drain cannot be reached
    /// Default: false
    pub require_reachable: bool,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            transport: TransportProtocol::Tcp,
            framing: Framing::OctetCounting,
            connection_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
            retry_attempts: 5,
            retry_interval: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            max_datagram_size: MAX_UDP_PAYLOAD,
            require_reachable: false,
        }
    }
}
