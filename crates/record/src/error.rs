//! Record error types

use thiserror::Error;

/// Result type for record operations
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors produced while building or decoding a record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The input is not a well-formed syslog line
    #[error("malformed record at byte {offset}: {reason}")]
    Malformed {
        /// Byte offset where parsing stopped
        offset: usize,
        /// What was wrong
        reason: &'static str,
    },

    /// A header field or structured data name cannot be represented on the wire
    #[error("invalid {field} '{value}': {reason}")]
    InvalidField {
        /// Field name (e.g. "hostname", "sd-id")
        field: &'static str,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl RecordError {
    /// Create a Malformed error
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::Malformed { offset, reason }
    }

    /// Create an InvalidField error
    pub(crate) fn invalid_field(
        field: &'static str,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
            reason,
        }
    }

    /// Whether this error came from decoding input
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
