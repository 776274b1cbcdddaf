//! One JSON object per report
//!
//! ```json
//! {"type":"metrics","pipeline":{"records_in":10,...,"forwarded_per_sec":2},
//!  "sources":[{"id":"unix_socket","type":"unix_socket",...}],
//!  "drains":[{"id":"logs.example.com:514","transport":"tcp",...}]}
//! ```
//!
//! Rate fields appear from the second report on and are whole numbers.

use super::MetricsFormatter;
use crate::{CollectedMetrics, MetricsRates};
use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

/// Totals serialized flat, with `extra` fields merged in
fn entry<T: Serialize>(totals: &T, extra: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    let mut value = serde_json::to_value(totals).unwrap_or_default();
    if let Value::Object(fields) = &mut value {
        for (key, field) in extra {
            fields.insert(key.to_string(), field);
        }
    }
    value
}

fn whole(rate: f64) -> Value {
    json!(rate.round() as u64)
}

impl MetricsFormatter for JsonFormatter {
    fn format(&self, metrics: &CollectedMetrics, rates: Option<&MetricsRates>) -> String {
        let mut report = Map::new();
        report.insert("type".into(), json!("metrics"));

        if let Some(pipeline) = &metrics.pipeline {
            let extra = rates.and_then(|r| r.pipeline).map(|r| {
                [
                    ("records_in_per_sec", whole(r.records_in_per_sec)),
                    ("forwarded_per_sec", whole(r.forwarded_per_sec)),
                ]
            });
            report.insert("pipeline".into(), entry(pipeline, extra.into_iter().flatten()));
        }

        if !metrics.sources.is_empty() {
            let sources = metrics
                .sources
                .iter()
                .map(|source| {
                    let mut extra = vec![
                        ("id", json!(source.id)),
                        ("type", json!(source.source_type)),
                    ];
                    if let Some(r) = rates.and_then(|r| r.source(&source.id)) {
                        extra.push(("messages_per_sec", whole(r.messages_per_sec)));
                    }
                    entry(&source.snapshot, extra)
                })
                .collect();
            report.insert("sources".into(), Value::Array(sources));
        }

        if !metrics.drains.is_empty() {
            let drains = metrics
                .drains
                .iter()
                .map(|drain| {
                    let mut extra = vec![
                        ("id", json!(drain.id)),
                        ("transport", json!(drain.transport)),
                    ];
                    if let Some(r) = rates.and_then(|r| r.drain(&drain.id)) {
                        extra.push(("records_per_sec", whole(r.records_per_sec)));
                        extra.push(("bytes_per_sec", whole(r.bytes_per_sec)));
                    }
                    entry(&drain.snapshot, extra)
                })
                .collect();
            report.insert("drains".into(), Value::Array(drains));
        }

        Value::Object(report).to_string()
    }
}
