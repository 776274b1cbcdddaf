//! RFC5424 decoder
//!
//! A hand-written cursor parser over the raw bytes. Header fields are
//! space-delimited; structured data is parsed element by element so that
//! escaped `"`, `\` and `]` inside param values round-trip exactly.

use chrono::{DateTime, FixedOffset};

use crate::structured_data::is_sd_name_byte;
use crate::{
    Facility, NILVALUE, Record, RecordError, Result, SYSLOG_VERSION, Severity, StructuredElement,
};

/// Largest valid PRI value (facility 23, severity 7)
const MAX_PRIVAL: u16 = 191;

/// Decode one RFC5424 line.
///
/// The whole buffer is one record; framing (octet counts, trailing newlines)
/// must already be removed. The message body is everything after the
/// structured data and the following space, taken verbatim (invalid UTF-8 is
/// replaced, never rejected).
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] on a bad priority, an unsupported
/// version, a missing or invalid timestamp, or broken structured data.
pub fn decode(buf: &[u8]) -> Result<Record> {
    let mut cursor = Cursor::new(buf);

    let (facility, severity) = cursor.priority()?;
    cursor.version()?;
    cursor.space()?;
    let timestamp = cursor.timestamp()?;
    cursor.space()?;
    let hostname = cursor.header_field()?;
    cursor.space()?;
    let app_name = cursor.header_field()?;
    cursor.space()?;
    let proc_id = cursor.header_field()?;
    cursor.space()?;
    let msg_id = cursor.header_field()?;
    cursor.space()?;
    let structured_data = cursor.structured_data()?;

    let message = if cursor.at_end() {
        String::new()
    } else {
        cursor.space()?;
        String::from_utf8_lossy(cursor.rest()).into_owned()
    };

    Ok(Record {
        facility,
        severity,
        timestamp,
        hostname,
        app_name,
        proc_id,
        msg_id,
        structured_data,
        message,
    })
}

/// Parse state: the input and the current byte offset
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos.min(self.buf.len())..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    fn error(&self, reason: &'static str) -> RecordError {
        RecordError::malformed(self.pos, reason)
    }

    fn expect(&mut self, byte: u8, reason: &'static str) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    pub(crate) fn space(&mut self) -> Result<()> {
        self.expect(b' ', "expected a space")
    }

    /// `<PRIVAL>` with 1-3 digits and a value of at most 191
    pub(crate) fn priority(&mut self) -> Result<(Facility, Severity)> {
        self.expect(b'<', "expected '<'")?;
        let start = self.pos;
        let mut prival: u16 = 0;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            prival = prival * 10 + u16::from(b - b'0');
            self.pos += 1;
            if self.pos - start > 3 {
                return Err(self.error("priority has more than 3 digits"));
            }
        }
        if self.pos == start {
            return Err(self.error("priority has no digits"));
        }
        self.expect(b'>', "expected '>'")?;
        if prival > MAX_PRIVAL {
            return Err(RecordError::malformed(start, "priority out of range"));
        }
        let prival = prival as u8;
        match (Facility::from_code(prival >> 3), Severity::from_code(prival & 0x7)) {
            (Some(facility), Some(severity)) => Ok((facility, severity)),
            _ => Err(RecordError::malformed(start, "priority out of range")),
        }
    }

    fn version(&mut self) -> Result<()> {
        match self.peek() {
            Some(b) if b == b'0' + SYSLOG_VERSION => {
                self.pos += 1;
                if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    return Err(self.error("unsupported version"));
                }
                Ok(())
            }
            Some(b) if b.is_ascii_digit() => Err(self.error("unsupported version")),
            _ => Err(self.error("expected version")),
        }
    }

    /// Bytes up to (not including) the next space or the end of input
    fn token(&mut self) -> &'a [u8] {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b' ' {
                break;
            }
            self.pos += 1;
        }
        &self.buf[start..self.pos]
    }

    fn timestamp(&mut self) -> Result<DateTime<FixedOffset>> {
        let start = self.pos;
        let token = self.token();
        if token == NILVALUE.as_bytes() {
            return Err(RecordError::malformed(start, "timestamp is required"));
        }
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .ok_or_else(|| RecordError::malformed(start, "invalid timestamp"))
    }

    /// One of HOSTNAME, APP-NAME, PROCID, MSGID; `-` decodes to `None`
    fn header_field(&mut self) -> Result<Option<String>> {
        let start = self.pos;
        let token = self.token();
        if token.is_empty() {
            return Err(RecordError::malformed(start, "empty header field"));
        }
        if token == NILVALUE.as_bytes() {
            return Ok(None);
        }
        if !token.iter().all(|b| (33..=126).contains(b)) {
            return Err(RecordError::malformed(
                start,
                "header field is not printable ASCII",
            ));
        }
        // All bytes are ASCII, so this cannot fail
        Ok(Some(String::from_utf8_lossy(token).into_owned()))
    }

    fn structured_data(&mut self) -> Result<Vec<StructuredElement>> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                if !self.at_end() && self.peek() != Some(b' ') {
                    return Err(self.error("expected a space after nil structured data"));
                }
                Ok(Vec::new())
            }
            Some(b'[') => {
                let mut elements = Vec::new();
                while self.peek() == Some(b'[') {
                    elements.push(self.element()?);
                }
                if !self.at_end() && self.peek() != Some(b' ') {
                    return Err(self.error("expected '[' or a space after structured data"));
                }
                Ok(elements)
            }
            _ => Err(self.error("expected structured data")),
        }
    }

    /// `[SD-ID *(SP PARAM-NAME="PARAM-VALUE")]`
    fn element(&mut self) -> Result<StructuredElement> {
        self.expect(b'[', "expected '['")?;
        let id = self.sd_name("empty structured data id")?;
        let mut params = Vec::new();
        loop {
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(StructuredElement::from_parts(id, params));
                }
                Some(b' ') => {
                    self.pos += 1;
                    let name = self.sd_name("empty param name")?;
                    self.expect(b'=', "expected '=' after param name")?;
                    let value = self.param_value()?;
                    params.push((name, value));
                }
                Some(_) => return Err(self.error("invalid character in structured data")),
                None => return Err(self.error("unterminated structured data element")),
            }
        }
    }

    fn sd_name(&mut self, empty_reason: &'static str) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_sd_name_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error(empty_reason));
        }
        Ok(String::from_utf8_lossy(&self.buf[start..self.pos]).into_owned())
    }

    /// Quoted value; `\"`, `\\` and `\]` are unescaped, any other backslash
    /// is kept as-is
    fn param_value(&mut self) -> Result<String> {
        self.expect(b'"', "expected '\"' to open param value")?;
        let start = self.pos;
        let mut value = Vec::new();
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(escaped @ (b'"' | b'\\' | b']')) => {
                            value.push(escaped);
                            self.pos += 1;
                        }
                        _ => value.push(b'\\'),
                    }
                }
                Some(b) => {
                    value.push(b);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated param value")),
            }
        }
        String::from_utf8(value)
            .map_err(|_| RecordError::malformed(start, "param value is not UTF-8"))
    }
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;
