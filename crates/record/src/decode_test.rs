use chrono::DateTime;

use crate::{Facility, Record, RecordError, Severity, StructuredElement, decode};

fn sample() -> Record {
    Record::builder("test-rfc5424")
        .facility(Facility::Local3)
        .severity(Severity::Warning)
        .timestamp(DateTime::parse_from_rfc3339("2024-03-01T12:34:56.123456+01:00").unwrap())
        .hostname("10.0.16.4")
        .app_name("syslog_forwarder")
        .proc_id("4321")
        .msg_id("ID47")
        .element(
            StructuredElement::new("instance@47450")
                .param("director", "bosh")
                .param("deployment", "cf")
                .param("group", "router")
                .param("az", "z1")
                .param("id", "6c6c6f35-1d2e-4b0f-9f5a-6c0e2a9a7e11"),
        )
        .build()
        .unwrap()
}

fn malformed(line: &[u8]) -> RecordError {
    match decode(line) {
        Ok(record) => panic!("expected error, decoded {record:?}"),
        Err(e) => {
            assert!(e.is_malformed(), "unexpected error kind: {e}");
            e
        }
    }
}

#[test]
fn test_round_trip() {
    let record = sample();
    let decoded = decode(&record.encode()).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_round_trip_escaped_values() {
    let record = Record::builder("body with \"quotes\" and ] brackets")
        .element(
            StructuredElement::new("meta")
                .param("q", r#"say "hi""#)
                .param("b", r"C:\path\")
                .param("c", "a]b")
                .param("s", "with space")
                .param("empty", ""),
        )
        .element(StructuredElement::new("origin"))
        .build()
        .unwrap();
    let decoded = decode(&record.encode()).unwrap();
    assert_eq!(decoded.structured_data(), record.structured_data());
    assert_eq!(decoded.message(), record.message());
}

#[test]
fn test_round_trip_large_message() {
    let body: String = (0..1025).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let record = Record::builder(body.clone()).build().unwrap();
    let decoded = decode(&record.encode()).unwrap();
    assert_eq!(decoded.message().len(), 1025);
    assert_eq!(decoded.message(), body);
}

#[test]
fn test_round_trip_multiline_and_unicode() {
    let record = Record::builder("line one\nline two \u{1F600}").build().unwrap();
    let decoded = decode(&record.encode()).unwrap();
    assert_eq!(decoded.message(), "line one\nline two \u{1F600}");
}

#[test]
fn test_decode_rfc_example() {
    let line = br#"<165>1 2003-10-11T22:14:15.003Z mymachine.example.com evntslog - ID47 [exampleSDID@32473 iut="3" eventSource="Application" eventID="1011"] An application event log entry..."#;
    let record = decode(line).unwrap();
    assert_eq!(record.facility(), Facility::Local4);
    assert_eq!(record.severity(), Severity::Notice);
    assert_eq!(record.hostname(), Some("mymachine.example.com"));
    assert_eq!(record.app_name(), Some("evntslog"));
    assert_eq!(record.proc_id(), None);
    assert_eq!(record.msg_id(), Some("ID47"));
    let element = record.element("exampleSDID@32473").unwrap();
    assert_eq!(element.get("iut"), Some("3"));
    assert_eq!(element.get("eventID"), Some("1011"));
    assert_eq!(record.message(), "An application event log entry...");
}

#[test]
fn test_decode_multiple_elements_no_message() {
    let record = decode(br#"<13>1 2024-01-01T00:00:00Z h a p m [a x="1"][b y="2"]"#).unwrap();
    assert_eq!(record.structured_data().len(), 2);
    assert_eq!(record.structured_data()[1].id(), "b");
    assert_eq!(record.message(), "");
}

#[test]
fn test_decode_unknown_escape_kept() {
    let record = decode(br#"<13>1 2024-01-01T00:00:00Z - - - - [a x="\n"] m"#).unwrap();
    assert_eq!(record.structured_data()[0].get("x"), Some(r"\n"));
}

#[test]
fn test_decode_empty_message_after_space() {
    let record = decode(b"<13>1 2024-01-01T00:00:00Z - - - - - ").unwrap();
    assert_eq!(record.message(), "");
}

#[test]
fn test_malformed_priority() {
    malformed(b"13>1 2024-01-01T00:00:00Z - - - - - m");
    malformed(b"<>1 2024-01-01T00:00:00Z - - - - - m");
    malformed(b"<192>1 2024-01-01T00:00:00Z - - - - - m");
    malformed(b"<0013>1 2024-01-01T00:00:00Z - - - - - m");
    malformed(b"<1a>1 2024-01-01T00:00:00Z - - - - - m");
}

#[test]
fn test_malformed_version() {
    malformed(b"<13>2 2024-01-01T00:00:00Z - - - - - m");
    malformed(b"<13>11 2024-01-01T00:00:00Z - - - - - m");
    malformed(b"<13> 2024-01-01T00:00:00Z - - - - - m");
}

#[test]
fn test_malformed_timestamp() {
    malformed(b"<13>1 - - - - - - m");
    malformed(b"<13>1 yesterday - - - - - m");
    malformed(b"<13>1 2024-13-01T00:00:00Z - - - - - m");
}

#[test]
fn test_malformed_structured_data() {
    malformed(br#"<13>1 2024-01-01T00:00:00Z - - - - [a x="1" m"#);
    malformed(br#"<13>1 2024-01-01T00:00:00Z - - - - [a x=1] m"#);
    malformed(br#"<13>1 2024-01-01T00:00:00Z - - - - [] m"#);
    malformed(br#"<13>1 2024-01-01T00:00:00Z - - - - [a x="1"]m"#);
    malformed(br#"<13>1 2024-01-01T00:00:00Z - - - - x m"#);
    malformed(br#"<13>1 2024-01-01T00:00:00Z - - - - -m"#);
}

#[test]
fn test_malformed_truncated_header() {
    let err = malformed(b"<13>1 2024-01-01T00:00:00Z host");
    assert!(matches!(err, RecordError::Malformed { .. }));
}

#[test]
fn test_decode_is_deterministic() {
    let line = sample().encode();
    assert_eq!(decode(&line).unwrap(), decode(&line).unwrap());
}
