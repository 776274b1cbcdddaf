//! RFC5424 encoder

use std::fmt::Write as _;

use chrono::SecondsFormat;

use crate::{NILVALUE, Record, SYSLOG_VERSION, StructuredElement};

impl Record {
    /// Serialize to a single RFC5424 line (no trailing newline)
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len_hint());
        self.encode_into(&mut buf);
        buf
    }

    /// Serialize, appending to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        let mut header = String::with_capacity(128);
        // Writing into a String cannot fail
        let _ = write!(
            header,
            "<{}>{} {} {} {} {} {} ",
            self.priority(),
            SYSLOG_VERSION,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.hostname.as_deref().unwrap_or(NILVALUE),
            self.app_name.as_deref().unwrap_or(NILVALUE),
            self.proc_id.as_deref().unwrap_or(NILVALUE),
            self.msg_id.as_deref().unwrap_or(NILVALUE),
        );
        buf.extend_from_slice(header.as_bytes());

        if self.structured_data.is_empty() {
            buf.extend_from_slice(NILVALUE.as_bytes());
        } else {
            for element in &self.structured_data {
                encode_element(element, buf);
            }
        }

        if !self.message.is_empty() {
            buf.push(b' ');
            buf.extend_from_slice(self.message.as_bytes());
        }
    }

    fn encoded_len_hint(&self) -> usize {
        let sd: usize = self
            .structured_data
            .iter()
            .map(|e| {
                e.id().len()
                    + 2
                    + e.params()
                        .iter()
                        .map(|(k, v)| k.len() + v.len() + 4)
                        .sum::<usize>()
            })
            .sum();
        96 + sd + self.message.len()
    }
}

fn encode_element(element: &StructuredElement, buf: &mut Vec<u8>) {
    buf.push(b'[');
    buf.extend_from_slice(element.id().as_bytes());
    for (name, value) in element.params() {
        buf.push(b' ');
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b"=\"");
        escape_param_value(value, buf);
        buf.push(b'"');
    }
    buf.push(b']');
}

/// PARAM-VALUE escaping: `"`, `\` and `]` get a leading backslash
fn escape_param_value(value: &str, buf: &mut Vec<u8>) {
    for &b in value.as_bytes() {
        if matches!(b, b'"' | b'\\' | b']') {
            buf.push(b'\\');
        }
        buf.push(b);
    }
}
