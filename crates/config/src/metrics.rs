//! `[metrics]` section
//!
//! The agent periodically logs its own counters. There is no metrics
//! endpoint; reports share the diagnostic output configured under `[log]`.

use serde::Deserialize;
use std::time::Duration;

/// How a report is rendered
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// One `[metrics]` line per component
    #[default]
    Human,
    /// One JSON object per report
    Json,
}

/// Periodic self-report of forwarding counters
///
/// ```toml
/// [metrics]
/// interval = "30s"
/// format = "json"
/// warn_on_loss = false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,

    /// Time between reports (default 60s)
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    pub format: MetricsFormat,

    /// Emit a warning when the drain gave up on records or a source saw
    /// undecodable input since the previous report
    pub warn_on_loss: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            format: MetricsFormat::default(),
            warn_on_loss: true,
        }
    }
}
