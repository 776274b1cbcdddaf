//! Per-file tail cursor

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use super::RateLimitedLogger;

/// Leading bytes remembered to recognise a rewritten file
pub const FINGERPRINT_LEN: usize = 256;

/// Identity of a file independent of its path (device + inode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl From<&Metadata> for FileIdentity {
    fn from(meta: &Metadata) -> Self {
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }
}

/// Cursor for one tailed file
///
/// `offset` counts bytes delivered as complete lines. Bytes read past it but
/// not yet terminated are held in `pending`, so the next read starts at
/// `offset + pending.len()`.
///
/// `fingerprint` holds the first bytes of the file already read past. A file
/// truncated and rewritten beyond the cursor between two polls keeps its
/// inode and length checks pass, but its head no longer matches.
#[derive(Debug)]
pub struct TailState {
    path: PathBuf,
    identity: FileIdentity,
    offset: u64,
    pending: Vec<u8>,
    fingerprint: Vec<u8>,
    skip_partial: bool,
    read_errors: RateLimitedLogger,
}

impl TailState {
    /// Start tracking `path` at `offset`
    pub fn new(path: PathBuf, identity: FileIdentity, offset: u64) -> Self {
        Self {
            path,
            identity,
            offset,
            pending: Vec::new(),
            fingerprint: Vec::new(),
            skip_partial: false,
            read_errors: RateLimitedLogger::default(),
        }
    }

    /// Drop the first line read, which started before `offset`
    pub fn skipping_partial(mut self) -> Self {
        self.skip_partial = true;
        self
    }

    /// Whether the next complete line is the tail of a line started
    /// before the cursor
    pub fn skips_partial(&self) -> bool {
        self.skip_partial
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> FileIdentity {
        self.identity
    }

    /// Bytes delivered so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Position of the next read
    pub fn read_position(&self) -> u64 {
        self.offset + self.pending.len() as u64
    }

    /// Whether the file at `identity` with length `len` is no longer the one
    /// this cursor describes, i.e. it was rotated or truncated
    pub fn is_stale(&self, identity: FileIdentity, len: u64) -> bool {
        identity != self.identity || len < self.read_position()
    }

    /// Whether `head`, the current first bytes of the file, still starts
    /// with what was read earlier
    pub fn head_matches(&self, head: &[u8]) -> bool {
        head.starts_with(&self.fingerprint)
    }

    /// Remember the part of `head` the cursor has moved past
    pub fn remember_head(&mut self, head: &[u8]) {
        let known = head.len().min(self.read_position() as usize);
        if known > self.fingerprint.len() {
            self.fingerprint = head[..known].to_vec();
        }
    }

    /// Restart from the beginning of a (possibly new) file
    pub fn reset(&mut self, identity: FileIdentity) {
        self.identity = identity;
        self.offset = 0;
        self.pending.clear();
        self.fingerprint.clear();
        self.skip_partial = false;
    }

    pub fn read_errors(&mut self) -> &mut RateLimitedLogger {
        &mut self.read_errors
    }

    /// Append freshly read bytes
    pub fn push(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Next complete line in the pending buffer, without consuming it
    ///
    /// Returns the line (CR stripped) and the number of bytes it occupies
    /// including the terminator.
    pub fn peek_line(&self) -> Option<(&[u8], usize)> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line = &self.pending[..newline];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        Some((line, newline + 1))
    }

    /// Mark `consumed` bytes as delivered
    pub fn advance(&mut self, consumed: usize) {
        self.pending.drain(..consumed);
        self.offset += consumed as u64;
        self.skip_partial = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(ino: u64) -> FileIdentity {
        FileIdentity { dev: 1, ino }
    }

    #[test]
    fn test_partial_line_retained() {
        let mut state = TailState::new("a.log".into(), identity(1), 0);
        state.push(b"first\r\nsec");

        let (line, consumed) = state.peek_line().unwrap();
        assert_eq!(line, b"first");
        assert_eq!(consumed, 7);
        state.advance(consumed);

        assert!(state.peek_line().is_none());
        assert_eq!(state.offset(), 7);
        assert_eq!(state.read_position(), 10);

        state.push(b"ond\n");
        let (line, consumed) = state.peek_line().unwrap();
        assert_eq!(line, b"second");
        state.advance(consumed);
        assert_eq!(state.offset(), 14);
    }

    #[test]
    fn test_stale_on_truncation_or_new_identity() {
        let mut state = TailState::new("a.log".into(), identity(1), 100);
        assert!(!state.is_stale(identity(1), 100));
        assert!(!state.is_stale(identity(1), 150));
        assert!(state.is_stale(identity(1), 10));
        assert!(state.is_stale(identity(2), 500));

        state.push(b"partial");
        state.reset(identity(2));
        assert_eq!(state.offset(), 0);
        assert_eq!(state.read_position(), 0);
        assert_eq!(state.identity(), identity(2));
    }

    #[test]
    fn test_rewritten_head_detected() {
        let mut state = TailState::new("a.log".into(), identity(1), 0);
        state.push(b"old line one\n");
        state.advance(13);

        let old = b"old line one\nold line two\n";
        state.remember_head(old);
        assert!(state.head_matches(old));
        assert!(!state.head_matches(b"brand new content that is much longer\n"));

        state.reset(identity(1));
        assert!(state.head_matches(b"brand new content that is much longer\n"));
    }

    #[test]
    fn test_fingerprint_capped_and_only_grows() {
        let mut state = TailState::new("a.log".into(), identity(1), 10_000);
        let head = vec![b'a'; FINGERPRINT_LEN];
        state.remember_head(&head);
        state.remember_head(&head[..8]);
        assert!(state.head_matches(&head));
        assert!(!state.head_matches(&head[..8]));
    }

    #[test]
    fn test_partial_skip_cleared_by_first_line() {
        let mut state = TailState::new("a.log".into(), identity(1), 5).skipping_partial();
        assert!(state.skips_partial());
        state.push(b"tail\nnext\n");
        let (_, consumed) = state.peek_line().unwrap();
        state.advance(consumed);
        assert!(!state.skips_partial());
    }
}
