//! Local syslog listener
//!
//! Receives datagrams written by local programs (`logger`, `syslog(3)`) and
//! turns each into a [`Record`](sysfwd_record::Record).
//!
//! # Sockets
//!
//! - **Unix datagram** at `sources.socket.path` (default `/dev/log`). A stale
//!   socket file left by a previous run is removed before binding, and the new
//!   socket is made world-writable (0666) so any local process can log.
//! - **UDP** at `sources.socket.udp_address` (optional), for emitters that
//!   only speak syslog over the network.
//!
//! # Design
//!
//! One task serves both sockets. Datagrams are decoded with
//! [`decode_local`](sysfwd_record::decode_local); undecodable ones are dropped
//! and counted as malformed. Nothing is ever written to a local file.

mod listener;

pub use listener::{SyslogListener, SyslogSourceError};
