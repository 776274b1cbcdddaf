//! Local syslog datagram decoding
//!
//! Programs writing to the local log socket (`logger`, `syslog(3)`) use
//! either RFC5424 or the older BSD layout:
//!
//! ```text
//! <PRI>Mmm dd hh:mm:ss [host ]tag[pid]: message
//! ```
//!
//! The timestamp and host are optional in practice; the PRI is not.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, TimeZone};

use crate::decode::Cursor;
use crate::{Record, Result, sanitize_header_field};

/// Length of `Mmm dd hh:mm:ss`
const BSD_TIMESTAMP_LEN: usize = 15;

const MAX_HOSTNAME_LEN: usize = 255;
const MAX_TAG_LEN: usize = 48;
const MAX_PID_LEN: usize = 128;

/// Decode a datagram received on the local log socket.
///
/// RFC5424 is tried when the PRI is followed by version `1`; otherwise the
/// BSD layout is assumed. BSD timestamps carry no year or zone, so they are
/// read in `now`'s offset and the year is chosen so the result is not more
/// than a day in the future. Missing timestamps become `now`, missing
/// hostnames become `default_hostname`.
///
/// # Errors
///
/// Returns `Malformed` when the datagram has no valid PRI, or when it claims
/// to be RFC5424 and fails to decode as such.
pub fn decode_local(
    buf: &[u8],
    now: DateTime<FixedOffset>,
    default_hostname: &str,
) -> Result<Record> {
    let buf = trim_trailer(buf);
    let mut cursor = Cursor::new(buf);
    let (facility, severity) = cursor.priority()?;

    if cursor.rest().starts_with(b"1 ") {
        let record = crate::decode(buf)?;
        if record.hostname().is_some() {
            return Ok(record);
        }
        return record
            .to_builder()
            .hostname(sanitize_header_field(default_hostname, MAX_HOSTNAME_LEN))
            .build();
    }

    let timestamp = match parse_bsd_timestamp(cursor.rest(), now) {
        Some(ts) => {
            cursor.advance(BSD_TIMESTAMP_LEN);
            if cursor.peek() == Some(b' ') {
                cursor.advance(1);
            }
            ts
        }
        None => now,
    };

    let rest = String::from_utf8_lossy(cursor.rest());
    let (host, rest) = split_host(&rest);
    let (tag, pid, message) = split_tag(rest);

    let mut builder = Record::builder(message)
        .facility(facility)
        .severity(severity)
        .timestamp(timestamp)
        .hostname(sanitize_header_field(
            host.unwrap_or(default_hostname),
            MAX_HOSTNAME_LEN,
        ));
    if let Some(tag) = tag {
        builder = builder.app_name(sanitize_header_field(tag, MAX_TAG_LEN));
    }
    if let Some(pid) = pid {
        builder = builder.proc_id(sanitize_header_field(pid, MAX_PID_LEN));
    }
    builder.build()
}

/// Drop trailing newlines and NULs that some clients append
fn trim_trailer(buf: &[u8]) -> &[u8] {
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r' | b'\0') {
        end -= 1;
    }
    &buf[..end]
}

fn parse_bsd_timestamp(buf: &[u8], now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let raw = std::str::from_utf8(buf.get(..BSD_TIMESTAMP_LEN)?).ok()?;
    // "Mar  1 ..." pads single-digit days with a space
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let at_year = |year: i32| {
        let naive =
            NaiveDateTime::parse_from_str(&format!("{year} {normalized}"), "%Y %b %d %H:%M:%S")
                .ok()?;
        now.offset().from_local_datetime(&naive).single()
    };

    let ts = at_year(now.year())?;
    if ts > now + Duration::days(1) {
        at_year(now.year() - 1)
    } else {
        Some(ts)
    }
}

/// Split off a leading hostname when the second token is the tag
fn split_host(rest: &str) -> (Option<&str>, &str) {
    let Some((first, tail)) = rest.split_once(' ') else {
        return (None, rest);
    };
    if looks_like_tag(first) {
        return (None, rest);
    }
    match tail.split(' ').next() {
        Some(second) if looks_like_tag(second) => (Some(first), tail),
        _ => (None, rest),
    }
}

fn looks_like_tag(token: &str) -> bool {
    token.ends_with(':') || token.contains('[')
}

/// `tag[pid]: message` or `tag: message`; anything else is all message
fn split_tag(rest: &str) -> (Option<&str>, Option<&str>, &str) {
    let Some(colon) = rest.find(": ").or_else(|| rest.strip_suffix(':').map(|s| s.len())) else {
        return (None, None, rest);
    };
    let head = &rest[..colon];
    if head.is_empty() || head.contains(' ') {
        return (None, None, rest);
    }
    let message = rest[colon + 1..].strip_prefix(' ').unwrap_or(&rest[colon + 1..]);

    if let Some(open) = head.find('[')
        && head.ends_with(']')
    {
        let tag = &head[..open];
        let pid = &head[open + 1..head.len() - 1];
        let tag = (!tag.is_empty()).then_some(tag);
        let pid = (!pid.is_empty()).then_some(pid);
        return (tag, pid, message);
    }
    (Some(head), None, message)
}
