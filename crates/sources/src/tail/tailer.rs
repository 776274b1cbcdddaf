use std::collections::BTreeMap;
use std::io::{self, SeekFrom};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sysfwd_config::FileSourceConfig;
use sysfwd_metrics::SourceMetrics;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use super::{FINGERPRINT_LEN, FileIdentity, FilePatterns, LineEvent, TailError, TailState};
use crate::SourceMetricsHandle;

/// Lines buffered between the tailer task and its consumer
const LINE_QUEUE_SIZE: usize = 1024;

/// Directory tailer
///
/// Owns the cursors of all watched files. Created and spawned by
/// [`start`](Self::start); consumers only see the [`TailStream`].
pub struct FileTailer {
    config: FileSourceConfig,
    patterns: FilePatterns,
    files: BTreeMap<PathBuf, TailState>,
    metrics: Arc<SourceMetrics>,
    read_buf: Vec<u8>,
}

impl FileTailer {
    /// Scan the root once and spawn the tailing task
    ///
    /// Files found now start at their end when `start_at_end` is set; files
    /// discovered later always start at offset 0.
    ///
    /// # Errors
    ///
    /// `RootMissing` when the root is not a directory, `InvalidPattern` when a
    /// pattern does not compile. Must be called within a Tokio runtime.
    pub fn start(
        config: FileSourceConfig,
        cancel: CancellationToken,
    ) -> Result<TailStream, TailError> {
        if !config.root.is_dir() {
            return Err(TailError::RootMissing { path: config.root });
        }

        let patterns = FilePatterns::new(&config.patterns)?;
        let found = scan(&config.root, &patterns);

        let mut tailer = Self {
            read_buf: vec![0u8; config.read_chunk_size.max(1)],
            config,
            patterns,
            files: BTreeMap::new(),
            metrics: Arc::new(SourceMetrics::new()),
        };
        let start_at_end = tailer.config.start_at_end;
        tailer.track(found, start_at_end);

        let (tx, rx) = mpsc::channel(LINE_QUEUE_SIZE);
        let metrics = Arc::clone(&tailer.metrics);
        let task = tokio::spawn(tailer.run(tx, cancel));

        Ok(TailStream {
            receiver: rx,
            metrics,
            task,
        })
    }

    async fn run(mut self, tx: mpsc::Sender<LineEvent>, cancel: CancellationToken) {
        tracing::info!(
            root = %self.config.root.display(),
            files = self.files.len(),
            "file tailer started"
        );

        let mut discovery = interval(self.config.discovery_interval);
        discovery.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Initial scan already happened in start()
        discovery.tick().await;

        let mut poll = interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                _ = discovery.tick() => self.discover().await,

                _ = poll.tick() => {
                    if self.poll_all(&tx, &cancel).await.is_break() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            root = %self.config.root.display(),
            lines = self.metrics.snapshot().messages_received,
            "file tailer stopped"
        );
    }

    /// Walk the root off the runtime threads and watch new files from 0
    async fn discover(&mut self) {
        let root = self.config.root.clone();
        let patterns = self.patterns.clone();

        match tokio::task::spawn_blocking(move || scan(&root, &patterns)).await {
            Ok(found) => self.track(found, false),
            Err(e) => tracing::warn!(error = %e, "file discovery task failed"),
        }
    }

    fn track(&mut self, paths: Vec<PathBuf>, start_at_end: bool) {
        for path in paths {
            if self.files.contains_key(&path) {
                continue;
            }

            let meta = match std::fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "cannot stat file");
                    continue;
                }
            };

            let identity = FileIdentity::from(&meta);
            let state = if start_at_end {
                self.start_of_last_line(&path, meta.len(), identity)
            } else {
                TailState::new(path.clone(), identity, 0)
            };
            tracing::debug!(path = %path.display(), offset = state.offset(), "watching file");
            self.files.insert(path, state);
        }

        self.metrics.set_files_watched(self.files.len() as u64);
    }

    /// Cursor just past the last complete line of an existing file
    ///
    /// Looks back at most one read chunk; a longer unfinished line starts
    /// the cursor at the end and its remainder is skipped.
    fn start_of_last_line(&self, path: &Path, len: u64, identity: FileIdentity) -> TailState {
        let window = self.read_buf.len() as u64;
        let from = len.saturating_sub(window);
        match read_range(path, from, len) {
            Ok(tail) => match tail.iter().rposition(|&b| b == b'\n') {
                Some(i) => TailState::new(path.to_path_buf(), identity, from + i as u64 + 1),
                None if from == 0 => TailState::new(path.to_path_buf(), identity, 0),
                None => TailState::new(path.to_path_buf(), identity, len).skipping_partial(),
            },
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cannot read file tail");
                TailState::new(path.to_path_buf(), identity, len)
            }
        }
    }

    async fn poll_all(
        &mut self,
        tx: &mpsc::Sender<LineEvent>,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        let mut vanished = Vec::new();

        for (path, state) in self.files.iter_mut() {
            match poll_file(state, &mut self.read_buf, &self.metrics, tx, cancel).await {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return ControlFlow::Break(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => vanished.push(path.clone()),
                Err(source) => {
                    self.metrics.record_error();
                    let error = TailError::Read {
                        path: path.clone(),
                        source,
                    };
                    state.read_errors().warn(path, &error);
                }
            }
        }

        if !vanished.is_empty() {
            for path in &vanished {
                tracing::debug!(path = %path.display(), "file removed, no longer watching");
                self.files.remove(path);
            }
            self.metrics.set_files_watched(self.files.len() as u64);
        }

        ControlFlow::Continue(())
    }
}

/// Read everything past the cursor that existed when the poll started
async fn poll_file(
    state: &mut TailState,
    buf: &mut [u8],
    metrics: &SourceMetrics,
    tx: &mpsc::Sender<LineEvent>,
    cancel: &CancellationToken,
) -> io::Result<ControlFlow<()>> {
    let mut file = File::open(state.path()).await?;
    let meta = file.metadata().await?;
    let identity = FileIdentity::from(&meta);
    let end = meta.len();

    let stale = state.is_stale(identity, end);
    if !stale && state.read_position() >= end {
        return Ok(ControlFlow::Continue(()));
    }

    let mut head = Vec::with_capacity(FINGERPRINT_LEN);
    (&mut file)
        .take(end.min(FINGERPRINT_LEN as u64))
        .read_to_end(&mut head)
        .await?;

    if stale || !state.head_matches(&head) {
        tracing::info!(
            path = %state.path().display(),
            "file rotated or truncated, reading from start"
        );
        state.reset(identity);
    }

    file.seek(SeekFrom::Start(state.read_position())).await?;

    while state.read_position() < end {
        let n = file.read(buf).await?;
        if n == 0 {
            break;
        }
        state.push(&buf[..n]);

        while let Some((line, consumed)) = state.peek_line() {
            if !line.is_empty() && !state.skips_partial() {
                let event = LineEvent {
                    path: state.path().to_path_buf(),
                    line: String::from_utf8_lossy(line).into_owned(),
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(ControlFlow::Break(())),
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            return Ok(ControlFlow::Break(()));
                        }
                    }
                }
                metrics.record_received(consumed as u64);
            }
            state.advance(consumed);
        }
    }

    state.remember_head(&head);
    Ok(ControlFlow::Continue(()))
}

/// Bytes `from..to` of `path`, read synchronously during the initial scan
fn read_range(path: &Path, from: u64, to: u64) -> io::Result<Vec<u8>> {
    use std::io::{Read, Seek};

    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(from))?;
    let mut buf = Vec::with_capacity(to.saturating_sub(from) as usize);
    file.take(to.saturating_sub(from)).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Regular files under `root` whose name matches `patterns`
fn scan(root: &Path, patterns: &FilePatterns) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| patterns.matches(name))
        })
        .map(|entry| entry.into_path())
        .collect()
}

// =============================================================================
// Stream
// =============================================================================

/// Live stream of lines from a running [`FileTailer`]
///
/// Infinite while the tailer runs; yields `None` once the tailer has been
/// cancelled and the buffered lines are consumed.
pub struct TailStream {
    receiver: mpsc::Receiver<LineEvent>,
    metrics: Arc<SourceMetrics>,
    task: JoinHandle<()>,
}

impl TailStream {
    /// Next complete line
    pub async fn next(&mut self) -> Option<LineEvent> {
        self.receiver.recv().await
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> SourceMetricsHandle {
        SourceMetricsHandle::new("files", Arc::clone(&self.metrics))
    }

    /// Wait for the tailer task to finish after cancellation
    pub async fn stopped(self) {
        drop(self.receiver);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "file tailer task failed");
        }
    }
}

#[cfg(test)]
#[path = "tailer_test.rs"]
mod tailer_test;
