//! Compiled filter rules

use std::str::FromStr;

use regex::Regex;
use sysfwd_config::FilterRuleConfig;
use sysfwd_record::{Record, Severity};

#[cfg(test)]
#[path = "rule_test.rs"]
mod tests;

/// What a rule does with records it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterAction {
    /// Drop records that match
    #[default]
    Drop,
    /// Keep only records that match (drop non-matches)
    Keep,
}

impl FromStr for FilterAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(Self::Drop),
            "keep" => Ok(Self::Keep),
            other => Err(format!("unknown action '{other}', expected drop or keep")),
        }
    }
}

/// Match condition
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Severity equals
    Severity(Severity),
    /// Severity is this level or less severe (`info` matches info and debug)
    SeverityAtOrBelow(Severity),
    /// Message contains the substring
    Contains(String),
    /// Message matches the regex
    Pattern(Regex),
}

impl Matcher {
    /// Check a record against this condition
    #[inline]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Severity(s) => record.severity() == *s,
            Self::SeverityAtOrBelow(s) => record.severity() >= *s,
            Self::Contains(needle) => record.message().contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(record.message()),
        }
    }
}

/// A match condition plus an action
#[derive(Debug, Clone)]
pub struct FilterRule {
    pub matcher: Matcher,
    pub action: FilterAction,
}

impl FilterRule {
    /// Rule that drops matching records
    pub fn drop(matcher: Matcher) -> Self {
        Self {
            matcher,
            action: FilterAction::Drop,
        }
    }

    /// Rule that drops non-matching records
    pub fn keep(matcher: Matcher) -> Self {
        Self {
            matcher,
            action: FilterAction::Keep,
        }
    }

    /// Whether this rule wants the record dropped
    #[inline]
    pub fn votes_drop(&self, record: &Record) -> bool {
        let matched = self.matcher.matches(record);
        match self.action {
            FilterAction::Drop => matched,
            FilterAction::Keep => !matched,
        }
    }
}

impl TryFrom<&FilterRuleConfig> for FilterRule {
    type Error = String;

    fn try_from(config: &FilterRuleConfig) -> Result<Self, Self::Error> {
        let action = config.action.parse::<FilterAction>()?;
        let matcher = parse_matcher(&config.kind, config.value.as_deref())?;
        Ok(Self { matcher, action })
    }
}

/// Parse match kind and operand
fn parse_matcher(kind: &str, value: Option<&str>) -> Result<Matcher, String> {
    let value = value.ok_or_else(|| format!("match kind '{kind}' requires a value"))?;
    match kind {
        "severity" => Ok(Matcher::Severity(parse_severity(value)?)),
        "severity_at_or_below" => Ok(Matcher::SeverityAtOrBelow(parse_severity(value)?)),
        "contains" => {
            if value.is_empty() {
                return Err("contains value must not be empty".to_string());
            }
            Ok(Matcher::Contains(value.to_string()))
        }
        "regex" => {
            let re = Regex::new(value).map_err(|e| format!("invalid regex '{value}': {e}"))?;
            Ok(Matcher::Pattern(re))
        }
        other => Err(format!(
            "unknown match kind '{other}', expected one of: severity, severity_at_or_below, contains, regex"
        )),
    }
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse::<Severity>().map_err(|e| e.to_string())
}
