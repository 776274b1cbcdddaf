//! Syslog severities (RFC5424 section 6.2.1)

use std::fmt;
use std::str::FromStr;

use crate::RecordError;

/// Syslog severity.
///
/// Ordered by wire code, so `Emergency < Debug`: a "greater" severity is a
/// *less* severe message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    #[default]
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// All severities in numeric order
    pub const ALL: [Severity; 8] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    /// Convert the wire code into a severity
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Wire code (0-7)
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Short lowercase name (`emerg`, `err`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emerg",
            Self::Alert => "alert",
            Self::Critical => "crit",
            Self::Error => "err",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = RecordError;

    /// Accepts wire codes and the usual aliases (`error`, `warn`, `panic`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(code) = lower.parse::<u8>() {
            return Self::from_code(code)
                .ok_or_else(|| RecordError::invalid_field("severity", s, "code out of range"));
        }
        let severity = match lower.as_str() {
            "emerg" | "emergency" | "panic" => Self::Emergency,
            "alert" => Self::Alert,
            "crit" | "critical" => Self::Critical,
            "err" | "error" => Self::Error,
            "warning" | "warn" => Self::Warning,
            "notice" => Self::Notice,
            "info" | "informational" => Self::Info,
            "debug" => Self::Debug,
            _ => {
                return Err(RecordError::invalid_field(
                    "severity",
                    s,
                    "unknown severity name",
                ));
            }
        };
        Ok(severity)
    }
}
