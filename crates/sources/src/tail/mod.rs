//! Log file tailer
//!
//! Follows every file under a root directory whose name matches the
//! configured patterns, emitting each complete line once.
//!
//! # Lifecycle
//!
//! ```text
//! start ──► initial scan (existing files start at end) ──► spawn task
//!              │
//!              ├── every discovery_interval: walk root, watch new files from offset 0
//!              └── every poll_interval: read bytes past each cursor, emit full lines
//! ```
//!
//! # Cursor rules
//!
//! - Only LF-terminated lines are emitted; a trailing partial line waits for
//!   its terminator. CR before LF is stripped.
//! - A cursor advances only after the line was accepted by the channel.
//! - A changed file identity (device + inode), a length below the cursor, or
//!   a file head that no longer matches the bytes already read resets the
//!   cursor to 0 and discards buffered partial bytes.
//! - Files found at startup with `start_at_end` begin after their last
//!   complete line, so a line being written at that moment arrives whole.
//! - Read errors affect only that file; it is retried on the next poll and
//!   warned about at most once per [`READ_ERROR_LOG_INTERVAL`].

mod pattern;
mod rate_limit;
mod state;
mod tailer;

use std::io;
use std::path::PathBuf;

pub use pattern::FilePatterns;
pub use rate_limit::{READ_ERROR_LOG_INTERVAL, RateLimitedLogger};
pub use state::{FINGERPRINT_LEN, FileIdentity, TailState};
pub use tailer::{FileTailer, TailStream};

/// One complete line read from a tailed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEvent {
    /// File the line came from
    pub path: PathBuf,
    /// Line content without its terminator (invalid UTF-8 replaced)
    pub line: String,
}

/// File tailer errors
#[derive(Debug, thiserror::Error)]
pub enum TailError {
    /// Root directory does not exist (fatal at startup)
    #[error("log root {} does not exist or is not a directory", path.display())]
    RootMissing { path: PathBuf },

    /// Invalid file name pattern
    #[error("invalid file pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Reading a single file failed (non-fatal)
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
