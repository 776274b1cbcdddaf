//! Record and its builder

use chrono::{DateTime, Datelike, FixedOffset, Utc};

use crate::{Facility, NILVALUE, RecordError, Severity, StructuredElement};

/// Header field length limits from RFC5424 section 6
const MAX_HOSTNAME_LEN: usize = 255;
const MAX_APP_NAME_LEN: usize = 48;
const MAX_PROC_ID_LEN: usize = 128;
const MAX_MSG_ID_LEN: usize = 32;

/// One log event.
///
/// Immutable once built; use [`Record::builder`] to construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) facility: Facility,
    pub(crate) severity: Severity,
    pub(crate) timestamp: DateTime<FixedOffset>,
    pub(crate) hostname: Option<String>,
    pub(crate) app_name: Option<String>,
    pub(crate) proc_id: Option<String>,
    pub(crate) msg_id: Option<String>,
    pub(crate) structured_data: Vec<StructuredElement>,
    pub(crate) message: String,
}

impl Record {
    /// Start building a record with the given message body
    pub fn builder(message: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(message)
    }

    /// Rebuild this record with changes (e.g. an injected structured data element)
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            record: self.clone(),
        }
    }

    pub fn facility(&self) -> Facility {
        self.facility
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// `facility * 8 + severity`
    pub fn priority(&self) -> u8 {
        self.facility.code() * 8 + self.severity.code()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn proc_id(&self) -> Option<&str> {
        self.proc_id.as_deref()
    }

    pub fn msg_id(&self) -> Option<&str> {
        self.msg_id.as_deref()
    }

    pub fn structured_data(&self) -> &[StructuredElement] {
        &self.structured_data
    }

    /// Find a structured data element by ID
    pub fn element(&self, id: &str) -> Option<&StructuredElement> {
        self.structured_data.iter().find(|e| e.id() == id)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Builder for [`Record`]
///
/// Defaults: facility `user`, severity `notice`, timestamp now (UTC), all
/// header fields nil, no structured data.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Create a builder with the given message body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            record: Record {
                facility: Facility::default(),
                severity: Severity::default(),
                timestamp: Utc::now().fixed_offset(),
                hostname: None,
                app_name: None,
                proc_id: None,
                msg_id: None,
                structured_data: Vec::new(),
                message: message.into(),
            },
        }
    }

    #[must_use]
    pub fn facility(mut self, facility: Facility) -> Self {
        self.record.facility = facility;
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.record.severity = severity;
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.record.timestamp = timestamp;
        self
    }

    /// Set the hostname; `-` or an empty string means unset
    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.record.hostname = non_nil(hostname.into());
        self
    }

    /// Set the app name; `-` or an empty string means unset
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.record.app_name = non_nil(app_name.into());
        self
    }

    /// Set the process ID; `-` or an empty string means unset
    #[must_use]
    pub fn proc_id(mut self, proc_id: impl Into<String>) -> Self {
        self.record.proc_id = non_nil(proc_id.into());
        self
    }

    /// Set the message ID; `-` or an empty string means unset
    #[must_use]
    pub fn msg_id(mut self, msg_id: impl Into<String>) -> Self {
        self.record.msg_id = non_nil(msg_id.into());
        self
    }

    /// Append a structured data element
    #[must_use]
    pub fn element(mut self, element: StructuredElement) -> Self {
        self.record.structured_data.push(element);
        self
    }

    /// Insert an element at the front, replacing any element with the same ID
    #[must_use]
    pub fn prepend_element(mut self, element: StructuredElement) -> Self {
        self.record
            .structured_data
            .retain(|e| e.id() != element.id());
        self.record.structured_data.insert(0, element);
        self
    }

    /// Validate and finish
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if the timestamp, a header field or a
    /// structured data name cannot be written to the wire unambiguously.
    pub fn build(self) -> Result<Record, RecordError> {
        let r = &self.record;
        validate_timestamp(&r.timestamp)?;
        validate_header("hostname", r.hostname.as_deref(), MAX_HOSTNAME_LEN)?;
        validate_header("app-name", r.app_name.as_deref(), MAX_APP_NAME_LEN)?;
        validate_header("procid", r.proc_id.as_deref(), MAX_PROC_ID_LEN)?;
        validate_header("msgid", r.msg_id.as_deref(), MAX_MSG_ID_LEN)?;
        for element in &r.structured_data {
            element.validate()?;
        }
        Ok(self.record)
    }
}

fn non_nil(value: String) -> Option<String> {
    if value.is_empty() || value == NILVALUE {
        None
    } else {
        Some(value)
    }
}

/// RFC3339 full-date has a four digit year and a minute-resolution offset
fn validate_timestamp(timestamp: &DateTime<FixedOffset>) -> Result<(), RecordError> {
    if !(0..=9999).contains(&timestamp.year()) {
        return Err(RecordError::invalid_field(
            "timestamp",
            timestamp.to_string(),
            "year must be between 0000 and 9999",
        ));
    }
    if timestamp.offset().local_minus_utc() % 60 != 0 {
        return Err(RecordError::invalid_field(
            "timestamp",
            timestamp.to_string(),
            "offset must be whole minutes",
        ));
    }
    Ok(())
}

/// Header fields are 1*N PRINTUSASCII (no spaces)
fn validate_header(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
) -> Result<(), RecordError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.len() > max_len {
        return Err(RecordError::invalid_field(field, value, "too long"));
    }
    if !value.bytes().all(|b| (33..=126).contains(&b)) {
        return Err(RecordError::invalid_field(
            field,
            value,
            "must be printable ASCII without spaces",
        ));
    }
    Ok(())
}

/// Make an arbitrary string usable as a header field.
///
/// Replaces anything outside printable ASCII with `_` and truncates to
/// `max_len` bytes. Returns `-` for empty input.
pub fn sanitize_header_field(value: &str, max_len: usize) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();
    if cleaned.is_empty() {
        NILVALUE.to_string()
    } else {
        cleaned
    }
}
