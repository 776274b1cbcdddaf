//! Pipeline tuning

use serde::Deserialize;
use std::time::Duration;

/// Pipeline configuration
///
/// # Example
///
/// ```toml
/// [pipeline]
/// queue_size = 4096
/// shutdown_grace = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of each bounded channel between stages
    /// Default: 4096
    pub queue_size: usize,

    /// How long shutdown waits for queued records to reach the drain
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_size: 4096,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}
