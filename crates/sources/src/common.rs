//! Common types shared by the socket listener and the file tailer

use std::sync::Arc;

use sysfwd_metrics::{SourceMetrics, SourceMetricsProvider, SourceMetricsSnapshot};

/// Handle for accessing source metrics
///
/// Holds an Arc to the metrics, so it remains valid after the source task
/// has consumed the source.
#[derive(Clone)]
pub struct SourceMetricsHandle {
    id: &'static str,
    metrics: Arc<SourceMetrics>,
}

impl SourceMetricsHandle {
    pub(crate) fn new(id: &'static str, metrics: Arc<SourceMetrics>) -> Self {
        Self { id, metrics }
    }
}

impl SourceMetricsProvider for SourceMetricsHandle {
    fn source_id(&self) -> &str {
        self.id
    }

    fn source_type(&self) -> &str {
        self.id
    }

    fn snapshot(&self) -> SourceMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Trim trailing line terminators (LF, CRLF) and NUL padding
#[inline]
pub(crate) fn trim_line_end(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && matches!(data[end - 1], b'\n' | b'\r' | b'\0') {
        end -= 1;
    }
    &data[..end]
}
