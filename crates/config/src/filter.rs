//! Filter rule configuration
//!
//! Rules are kept as raw strings here; the filter engine compiles them and
//! reports unknown kinds, actions or severities.

use serde::Deserialize;

/// Filter section
///
/// # Example
///
/// ```toml
/// [[filter.rules]]
/// match = "contains"
/// value = "This is a DEBUG message that we filter out"
/// action = "drop"
///
/// [[filter.rules]]
/// match = "severity_at_or_below"
/// value = "debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Rules, evaluated together
    pub rules: Vec<FilterRuleConfig>,
}

/// One raw filter rule
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FilterRuleConfig {
    /// Match kind: severity, severity_at_or_below, contains, regex
    #[serde(rename = "match")]
    pub kind: String,

    /// Operand for the match kind
    #[serde(default)]
    pub value: Option<String>,

    /// drop or keep
    /// Default: drop
    #[serde(default = "default_action")]
    pub action: String,
}

impl FilterRuleConfig {
    /// Create a rule from its parts
    pub fn new(kind: impl Into<String>, value: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
            action: action.into(),
        }
    }
}

fn default_action() -> String {
    "drop".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rules() {
        let toml = r#"
[[rules]]
match = "contains"
value = "DEBUG"

[[rules]]
match = "severity"
value = "err"
action = "keep"
"#;
        let config: FilterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0], FilterRuleConfig::new("contains", "DEBUG", "drop"));
        assert_eq!(config.rules[1].action, "keep");
    }

    #[test]
    fn test_match_is_required() {
        assert!(toml::from_str::<FilterConfig>("[[rules]]\nvalue = \"x\"").is_err());
    }
}
