//! Stream framing for syslog over TCP (RFC6587)
//!
//! # Octet counting
//!
//! ```text
//! MSG-LEN SP SYSLOG-MSG
//! 1025 <14>1 2024-05-01T10:00:00.000000Z host app - - [instance@47450 ...] ...
//! ```
//!
//! # Non-transparent
//!
//! Each record is terminated by LF. Line breaks inside the record are escaped
//! the way rsyslog escapes control characters (`\r` → `#015`, `\n` → `#012`),
//! so one record is always exactly one frame.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt::Write;
use sysfwd_config::Framing;

use crate::TransportError;

/// Longest accepted `MSG-LEN` prefix (digits)
const MAX_LEN_DIGITS: usize = 10;

/// Append one framed record to `out`
pub fn encode_frame(framing: Framing, record: &[u8], out: &mut BytesMut) {
    match framing {
        Framing::OctetCounting => {
            out.reserve(record.len() + MAX_LEN_DIGITS + 1);
            let _ = write!(out, "{} ", record.len());
            out.put_slice(record);
        }
        Framing::NonTransparent => {
            out.reserve(record.len() + 1);
            for &b in record {
                match b {
                    b'\r' => out.put_slice(b"#015"),
                    b'\n' => out.put_slice(b"#012"),
                    _ => out.put_u8(b),
                }
            }
            out.put_u8(b'\n');
        }
    }
}

/// Incremental decoder for framed records
///
/// Feed received bytes with [`extend`](Self::extend) and pull complete frames
/// with [`decode`](Self::decode). Partial frames stay buffered.
#[derive(Debug)]
pub struct FrameDecoder {
    framing: Framing,
    buf: BytesMut,
}

impl FrameDecoder {
    /// Create a decoder for the given framing
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buf: BytesMut::with_capacity(8 * 1024),
        }
    }

    /// Append received bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes buffered but not yet returned as a frame
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Take the next complete frame, if any
    ///
    /// Non-transparent frames are returned without their LF terminator and
    /// with escapes left in place.
    pub fn decode(&mut self) -> Result<Option<Bytes>, TransportError> {
        match self.framing {
            Framing::OctetCounting => self.decode_octet_counted(),
            Framing::NonTransparent => Ok(self.decode_line()),
        }
    }

    fn decode_octet_counted(&mut self) -> Result<Option<Bytes>, TransportError> {
        let Some(space) = self.buf.iter().position(|&b| b == b' ') else {
            if self.buf.len() > MAX_LEN_DIGITS {
                return Err(TransportError::InvalidFrame(
                    "missing length prefix".into(),
                ));
            }
            return Ok(None);
        };

        let digits = &self.buf[..space];
        if digits.is_empty()
            || digits.len() > MAX_LEN_DIGITS
            || digits[0] == b'0'
            || !digits.iter().all(u8::is_ascii_digit)
        {
            return Err(TransportError::InvalidFrame(format!(
                "bad length prefix {:?}",
                String::from_utf8_lossy(digits)
            )));
        }

        let len: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| TransportError::InvalidFrame("length prefix overflow".into()))?;

        if self.buf.len() < space + 1 + len {
            return Ok(None);
        }

        let _ = self.buf.split_to(space + 1);
        Ok(Some(self.buf.split_to(len).freeze()))
    }

    fn decode_line(&mut self) -> Option<Bytes> {
        let newline = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line = self.buf.split_to(newline + 1);
        line.truncate(newline);
        Some(line.freeze())
    }
}

#[cfg(test)]
#[path = "framing_test.rs"]
mod framing_test;
