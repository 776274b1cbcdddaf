//! sysfwd - Record Model
//!
//! In-memory representation of one syslog event and its RFC5424 wire format.
//!
//! # Wire Format
//!
//! ```text
//! <PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID STRUCTURED-DATA [MSG]
//! ```
//!
//! - `PRI` is `facility * 8 + severity`
//! - Unset header fields are written as the nil value `-`
//! - Structured data elements are concatenated `[ID name="value" ...]` blocks,
//!   or `-` when there are none
//!
//! # Guarantees
//!
//! - `decode(encode(r))` preserves structured data and the message body exactly
//! - The builder rejects header values the decoder could not read back, so the
//!   encoder never produces a line that fails its own decoder
//! - No length limit is imposed on the message body
//!
//! # Example
//!
//! ```
//! use sysfwd_record::{Record, Severity, StructuredElement};
//!
//! let record = Record::builder("test-rfc5424")
//!     .severity(Severity::Info)
//!     .hostname("10.0.16.4")
//!     .app_name("router")
//!     .element(StructuredElement::new("instance@47450").param("az", "z1"))
//!     .build()
//!     .unwrap();
//!
//! let line = record.encode();
//! let decoded = sysfwd_record::decode(&line).unwrap();
//! assert_eq!(decoded.message(), "test-rfc5424");
//! assert_eq!(decoded.structured_data()[0].id(), "instance@47450");
//! ```

mod decode;
mod encode;
mod error;
mod facility;
mod local;
mod record;
mod severity;
mod structured_data;

pub use decode::decode;
pub use error::{RecordError, Result};
pub use facility::Facility;
pub use local::decode_local;
pub use record::{Record, RecordBuilder, sanitize_header_field};
pub use severity::Severity;
pub use structured_data::StructuredElement;

/// The only syslog protocol version this crate reads or writes
pub const SYSLOG_VERSION: u8 = 1;

/// Nil value for unset header fields and empty structured data
pub const NILVALUE: &str = "-";
