//! Report rendering

mod human;
mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use crate::{CollectedMetrics, MetricsRates};

/// Renders one report
///
/// `rates` is absent for the first report after startup. Multi-line output
/// is logged line by line.
pub trait MetricsFormatter: Send + Sync {
    fn format(&self, metrics: &CollectedMetrics, rates: Option<&MetricsRates>) -> String;
}

const DECIMAL: [(f64, &str); 2] = [(1_000_000.0, "M"), (1_000.0, "K")];
const BINARY: [(f64, &str); 2] = [(1_048_576.0, " MB"), (1_024.0, " KB")];

fn scaled(value: f64, scales: &[(f64, &str)]) -> Option<String> {
    scales
        .iter()
        .find(|(scale, _)| value >= *scale)
        .map(|(scale, suffix)| format!("{:.1}{suffix}", value / scale))
}

/// `950`, `12.3K`, `4.0M`
pub fn count(n: u64) -> String {
    scaled(n as f64, &DECIMAL).unwrap_or_else(|| n.to_string())
}

/// `7/s`, `1.2K/s`
pub fn per_sec(rate: f64) -> String {
    let value = scaled(rate, &DECIMAL).unwrap_or_else(|| format!("{rate:.0}"));
    format!("{value}/s")
}

/// `512 B/s`, `2.0 KB/s`, `1.5 MB/s`
pub fn bytes_per_sec(rate: f64) -> String {
    let value = scaled(rate, &BINARY).unwrap_or_else(|| format!("{rate:.0} B"));
    format!("{value}/s")
}
