//! Per-file warning throttle
//!
//! A file that stays unreadable (permissions, a stale NFS handle) fails on
//! every poll. The first failure is logged right away; later ones at most
//! once per interval, with the number of failures suppressed in between.

use std::fmt::Display;
use std::path::Path;
use std::time::{Duration, Instant};

/// Minimum time between two warnings for the same file
pub const READ_ERROR_LOG_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct RateLimitedLogger {
    min_interval: Duration,
    last_logged: Option<Instant>,
    suppressed: u64,
}

impl RateLimitedLogger {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_logged: None,
            suppressed: 0,
        }
    }

    /// Warn about a failed read of `path` unless one was logged recently
    ///
    /// Returns whether a warning was emitted.
    pub fn warn(&mut self, path: &Path, error: &dyn Display) -> bool {
        self.warn_at(Instant::now(), path, error)
    }

    fn warn_at(&mut self, now: Instant, path: &Path, error: &dyn Display) -> bool {
        let due = self
            .last_logged
            .is_none_or(|last| now.duration_since(last) >= self.min_interval);
        if !due {
            self.suppressed += 1;
            return false;
        }

        let suppressed = std::mem::take(&mut self.suppressed);
        self.last_logged = Some(now);
        if suppressed > 0 {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                suppressed,
                "tail read failed (rate-limited)"
            );
        } else {
            tracing::warn!(path = %path.display(), error = %error, "tail read failed");
        }
        true
    }

    /// Failures not yet reported
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(READ_ERROR_LOG_INTERVAL)
    }
}
