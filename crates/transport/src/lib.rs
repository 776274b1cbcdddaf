//! sysfwd - Transport
//!
//! Delivers RFC5424 records to the remote drain.
//!
//! # Protocols
//!
//! | Protocol | Unit on the wire | Notes |
//! |----------|------------------|-------|
//! | UDP | one record per datagram | never fragmented by us; ceiling `max_datagram_size` |
//! | TCP | one frame per record | octet counting (default) or non-transparent LF |
//!
//! # Failure handling
//!
//! ```text
//! send ──► fail ──► wait retry_interval ──► reconnect + send ──► fail ──► wait 2x ...
//!                                                          (capped at max_backoff)
//! after retry_attempts: RetriesExhausted ──► sink drops + counts the record
//! ```

mod config;
mod error;
pub mod framing;
mod sink;
mod tcp;
mod transport;
mod udp;

pub use config::TransportConfig;
pub use error::TransportError;
pub use framing::{FrameDecoder, encode_frame};
pub use sink::{DrainMetricsHandle, DrainSink};
pub use transport::DrainTransport;
