//! Lost-record detection between reports

use crate::CollectedMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    /// The drain gave up after its last retry
    Dropped,
    /// A source discarded input it could not decode
    Malformed,
}

impl LossKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Dropped => "drain dropped records after exhausting retries",
            Self::Malformed => "source discarded malformed messages",
        }
    }
}

/// Records lost by one component since the previous report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loss {
    pub component: String,
    pub kind: LossKind,
    pub count: u64,
}

/// Losses in `current` not yet present in `previous`
///
/// Without a previous collection every loss since startup counts.
pub(crate) fn losses_since(
    current: &CollectedMetrics,
    previous: Option<&CollectedMetrics>,
) -> Vec<Loss> {
    let drains = current.drains.iter().map(|drain| {
        let before = previous
            .and_then(|p| p.drain(&drain.id))
            .map_or(0, |d| d.snapshot.records_dropped);
        Loss {
            component: drain.id.clone(),
            kind: LossKind::Dropped,
            count: drain.snapshot.records_dropped.saturating_sub(before),
        }
    });

    let sources = current.sources.iter().map(|source| {
        let before = previous
            .and_then(|p| p.source(&source.id))
            .map_or(0, |s| s.snapshot.messages_malformed);
        Loss {
            component: source.id.clone(),
            kind: LossKind::Malformed,
            count: source.snapshot.messages_malformed.saturating_sub(before),
        }
    });

    drains.chain(sources).filter(|loss| loss.count > 0).collect()
}
