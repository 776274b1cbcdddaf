//! Tests for the filter engine

use super::*;
use std::sync::Arc;
use sysfwd_record::Severity;

fn record(severity: Severity, message: &str) -> Record {
    Record::builder(message).severity(severity).build().unwrap()
}

#[test]
fn test_empty_engine_forwards_everything() {
    let engine = FilterEngine::load(&[]).unwrap();
    assert!(engine.is_empty());
    for severity in Severity::ALL {
        assert_eq!(engine.evaluate(&record(severity, "x")), Verdict::Forward);
    }
}

#[test]
fn test_severity_debug_drop_rule() {
    let engine = FilterEngine::load(&[FilterRuleConfig::new("severity", "debug", "drop")]).unwrap();

    for severity in Severity::ALL {
        let expected = if severity == Severity::Debug {
            Verdict::Drop
        } else {
            Verdict::Forward
        };
        let r = record(severity, "message");
        // Same answer every time
        for _ in 0..3 {
            assert_eq!(engine.evaluate(&r), expected, "severity {severity}");
        }
    }
}

#[test]
fn test_exact_string_drop_rule() {
    let engine = FilterEngine::from_toml_str(
        r#"
[[rules]]
match = "contains"
value = "This is a DEBUG message that we filter out"
action = "drop"
"#,
    )
    .unwrap();

    assert_eq!(
        engine.evaluate(&record(
            Severity::Info,
            "This is a DEBUG message that we filter out"
        )),
        Verdict::Drop
    );
    assert_eq!(
        engine.evaluate(&record(Severity::Info, "test-rfc5424")),
        Verdict::Forward
    );
}

#[test]
fn test_any_drop_vote_wins() {
    let engine = FilterEngine::load(&[
        FilterRuleConfig::new("contains", "noise", "drop"),
        FilterRuleConfig::new("severity_at_or_below", "debug", "drop"),
    ])
    .unwrap();

    assert_eq!(engine.evaluate(&record(Severity::Info, "noise")), Verdict::Drop);
    assert_eq!(engine.evaluate(&record(Severity::Debug, "signal")), Verdict::Drop);
    assert_eq!(engine.evaluate(&record(Severity::Info, "signal")), Verdict::Forward);
}

#[test]
fn test_keep_rule_drops_non_matches() {
    let engine = FilterEngine::load(&[
        FilterRuleConfig::new("regex", r"^\[router\]", "keep"),
        FilterRuleConfig::new("contains", "healthcheck", "drop"),
    ])
    .unwrap();

    assert_eq!(engine.evaluate(&record(Severity::Info, "[router] up")), Verdict::Forward);
    assert_eq!(engine.evaluate(&record(Severity::Info, "[api] up")), Verdict::Drop);
    assert_eq!(
        engine.evaluate(&record(Severity::Info, "[router] healthcheck")),
        Verdict::Drop
    );
}

#[test]
fn test_rule_order_does_not_matter() {
    let a = FilterRuleConfig::new("contains", "x", "drop");
    let b = FilterRuleConfig::new("severity", "err", "keep");
    let forward = FilterEngine::load(&[a.clone(), b.clone()]).unwrap();
    let reverse = FilterEngine::load(&[b, a]).unwrap();

    for (severity, msg) in [
        (Severity::Error, "x"),
        (Severity::Error, "y"),
        (Severity::Info, "x"),
        (Severity::Info, "y"),
    ] {
        let r = record(severity, msg);
        assert_eq!(forward.evaluate(&r), reverse.evaluate(&r));
    }
}

#[test]
fn test_load_reports_failing_rule_index() {
    let err = FilterEngine::load(&[
        FilterRuleConfig::new("contains", "ok", "drop"),
        FilterRuleConfig::new("sounds_like", "x", "drop"),
    ])
    .unwrap_err();

    let FilterError::InvalidRuleConfig { location, reason } = err;
    assert_eq!(location, "rules[1]");
    assert!(reason.contains("sounds_like"));
}

#[test]
fn test_from_toml_str_rejects_bad_toml() {
    let err = FilterEngine::from_toml_str("[[rules]\nmatch = ").unwrap_err();
    assert!(matches!(err, FilterError::InvalidRuleConfig { ref location, .. } if location == "toml"));
}

#[test]
fn test_engine_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FilterEngine>();

    let engine = Arc::new(FilterEngine::load(&[FilterRuleConfig::new("severity", "debug", "drop")]).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.evaluate(&record(Severity::Debug, "x")))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Verdict::Drop);
    }
}
