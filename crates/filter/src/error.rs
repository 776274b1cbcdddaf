//! Filter error types

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while loading filter rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A rule could not be compiled
    #[error("invalid filter rule {location}: {reason}")]
    InvalidRuleConfig {
        /// Which rule, e.g. `rules[2]`, or `toml` for a parse failure
        location: String,
        /// What was wrong
        reason: String,
    },
}

impl FilterError {
    /// Create an InvalidRuleConfig error for the rule at `index`
    pub fn invalid_rule(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRuleConfig {
            location: format!("rules[{index}]"),
            reason: reason.into(),
        }
    }

    /// Create an InvalidRuleConfig error for unparseable TOML
    pub fn invalid_toml(reason: impl Into<String>) -> Self {
        Self::InvalidRuleConfig {
            location: "toml".to_string(),
            reason: reason.into(),
        }
    }
}
