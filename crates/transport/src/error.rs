//! Transport errors

use std::io;
use std::time::Duration;

/// Errors from delivering a record to the drain
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed
    #[error("connection failed to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Write failed
    #[error("write failed: {0}")]
    Write(#[from] io::Error),

    /// Connect or write did not finish in time
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// All retry attempts exhausted
    #[error("all {attempts} send attempts failed: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Datagram rejected by the OS as too large
    #[error("datagram of {size} bytes rejected (ceiling {limit}): {source}")]
    Oversize {
        size: usize,
        limit: usize,
        #[source]
        source: io::Error,
    },

    /// Received bytes are not a valid frame
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl TransportError {
    /// Whether another attempt can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Oversize { .. } | Self::InvalidFrame(_))
    }
}
