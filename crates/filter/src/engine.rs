//! Filter engine

use sysfwd_config::{FilterConfig, FilterRuleConfig};
use sysfwd_record::Record;

use crate::{FilterError, FilterResult, FilterRule};

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

/// Outcome of evaluating a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Send the record to the drain
    Forward,
    /// Discard the record
    Drop,
}

/// Immutable set of compiled rules.
///
/// A record is dropped when any rule votes to drop it, so rule order never
/// changes the outcome. With no rules every record is forwarded.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    rules: Vec<FilterRule>,
}

impl FilterEngine {
    /// Create an engine from already compiled rules
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Compile raw rules
    ///
    /// # Errors
    ///
    /// Returns `InvalidRuleConfig` naming the first rule that fails to
    /// compile.
    pub fn load(configs: &[FilterRuleConfig]) -> FilterResult<Self> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(i, config)| {
                FilterRule::try_from(config).map_err(|reason| FilterError::invalid_rule(i, reason))
            })
            .collect::<FilterResult<Vec<_>>>()?;

        tracing::debug!(rules = rules.len(), "filter rules loaded");
        Ok(Self { rules })
    }

    /// Compile rules from a TOML document holding `[[rules]]` tables
    ///
    /// # Errors
    ///
    /// Returns `InvalidRuleConfig` for unparseable TOML or a bad rule.
    pub fn from_toml_str(s: &str) -> FilterResult<Self> {
        let config: FilterConfig =
            toml::from_str(s).map_err(|e| FilterError::invalid_toml(e.to_string()))?;
        Self::load(&config.rules)
    }

    /// Decide whether a record is forwarded
    pub fn evaluate(&self, record: &Record) -> Verdict {
        if self.rules.iter().any(|rule| rule.votes_drop(record)) {
            Verdict::Drop
        } else {
            Verdict::Forward
        }
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when every record is forwarded
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
