//! sysfwd - Sources
//!
//! Ingestion sources feeding the pipeline coordinator.
//!
//! # Available Sources
//!
//! - **Syslog listener** - local Unix datagram socket (`/dev/log`) and an
//!   optional UDP socket; yields decoded [`Record`](sysfwd_record::Record)s
//! - **File tailer** - recursive directory tail; yields raw [`LineEvent`]s
//!
//! # Design Principles
//!
//! - **Bounded hand-off**: every source feeds its own `tokio::sync::mpsc`
//!   channel, so per-source ordering is preserved and a slow drain applies
//!   backpressure instead of growing memory
//! - **Cancellation**: every blocking point selects on a `CancellationToken`
//! - **No local writes**: sources read logs, they never persist them
//!
//! # Example
//!
//! ```ignore
//! use sysfwd_sources::{FileTailer, SyslogListener};
//!
//! let listener = SyslogListener::bind(&config.sources.socket, hostname)?;
//! let (tx, rx) = mpsc::channel(4096);
//! tokio::spawn(listener.run(tx, cancel.clone()));
//!
//! let mut lines = FileTailer::start(config.sources.files.clone(), cancel.clone())?;
//! while let Some(event) = lines.next().await {
//!     println!("{}: {}", event.path.display(), event.line);
//! }
//! ```

mod common;
pub mod syslog;
pub mod tail;

pub use common::SourceMetricsHandle;
pub use syslog::{SyslogListener, SyslogSourceError};
pub use tail::{FilePatterns, FileTailer, LineEvent, TailError, TailStream};
