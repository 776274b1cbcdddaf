//! Tests for filter rules

use super::*;

fn record(severity: Severity, message: &str) -> Record {
    Record::builder(message).severity(severity).build().unwrap()
}

fn rule(kind: &str, value: &str, action: &str) -> Result<FilterRule, String> {
    FilterRule::try_from(&FilterRuleConfig::new(kind, value, action))
}

#[test]
fn test_severity_exact() {
    let m = Matcher::Severity(Severity::Debug);
    assert!(m.matches(&record(Severity::Debug, "x")));
    assert!(!m.matches(&record(Severity::Info, "x")));
    assert!(!m.matches(&record(Severity::Error, "x")));
}

#[test]
fn test_severity_at_or_below() {
    let m = Matcher::SeverityAtOrBelow(Severity::Info);
    assert!(m.matches(&record(Severity::Info, "x")));
    assert!(m.matches(&record(Severity::Debug, "x")));
    assert!(!m.matches(&record(Severity::Notice, "x")));
    assert!(!m.matches(&record(Severity::Emergency, "x")));
}

#[test]
fn test_contains_is_case_sensitive() {
    let m = Matcher::Contains("DEBUG".into());
    assert!(m.matches(&record(Severity::Info, "This is a DEBUG message")));
    assert!(!m.matches(&record(Severity::Info, "this is a debug message")));
}

#[test]
fn test_pattern() {
    let m = Matcher::Pattern(Regex::new(r"^health(check)?$").unwrap());
    assert!(m.matches(&record(Severity::Info, "healthcheck")));
    assert!(!m.matches(&record(Severity::Info, "unhealthy")));
}

#[test]
fn test_votes_drop() {
    let debug = record(Severity::Debug, "x");
    let info = record(Severity::Info, "x");

    let drop_debug = FilterRule::drop(Matcher::Severity(Severity::Debug));
    assert!(drop_debug.votes_drop(&debug));
    assert!(!drop_debug.votes_drop(&info));

    let keep_debug = FilterRule::keep(Matcher::Severity(Severity::Debug));
    assert!(!keep_debug.votes_drop(&debug));
    assert!(keep_debug.votes_drop(&info));
}

#[test]
fn test_from_config() {
    let r = rule("severity", "debug", "drop").unwrap();
    assert!(matches!(r.matcher, Matcher::Severity(Severity::Debug)));
    assert_eq!(r.action, FilterAction::Drop);

    let r = rule("severity_at_or_below", "warn", "keep").unwrap();
    assert!(matches!(r.matcher, Matcher::SeverityAtOrBelow(Severity::Warning)));
    assert_eq!(r.action, FilterAction::Keep);

    let r = rule("regex", "a+b", "drop").unwrap();
    assert!(matches!(r.matcher, Matcher::Pattern(_)));
}

#[test]
fn test_from_config_errors() {
    assert!(rule("fuzzy", "x", "drop").unwrap_err().contains("unknown match kind"));
    assert!(rule("contains", "x", "discard").unwrap_err().contains("unknown action"));
    assert!(rule("severity", "verbose", "drop").is_err());
    assert!(rule("regex", "(unclosed", "drop").unwrap_err().contains("invalid regex"));
    assert!(rule("contains", "", "drop").is_err());

    let missing_value = FilterRuleConfig {
        kind: "contains".into(),
        value: None,
        action: "drop".into(),
    };
    assert!(
        FilterRule::try_from(&missing_value)
            .unwrap_err()
            .contains("requires a value")
    );
}
