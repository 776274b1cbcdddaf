//! Pipeline lifecycle
//!
//! ```text
//! Disabled                    (enabled = false, nothing is built)
//! Idle ──start──▶ Running ──shutdown──▶ Draining ──▶ Stopped
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use sysfwd_config::Config;

/// Lifecycle state of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    /// Forwarding switched off in configuration
    Disabled = 0,
    /// Built, nothing running yet
    Idle = 1,
    /// Sources, coordinator and drain sink running
    Running = 2,
    /// Inputs stopped, in-flight records being delivered
    Draining = 3,
    /// Every task has finished
    Stopped = 4,
}

impl PipelineState {
    /// State a pipeline built from `config` starts in
    pub fn for_config(config: &Config) -> Self {
        if config.enabled {
            Self::Idle
        } else {
            Self::Disabled
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Disabled,
            1 => Self::Idle,
            2 => Self::Running,
            3 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, lock-free cell holding the current state
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new(state: PipelineState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    pub(crate) fn get(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: PipelineState) {
        let previous = PipelineState::from_u8(self.0.swap(state as u8, Ordering::AcqRel));
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "pipeline state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_config() {
        let mut config = Config::default();
        assert_eq!(PipelineState::for_config(&config), PipelineState::Idle);

        config.enabled = false;
        assert_eq!(PipelineState::for_config(&config), PipelineState::Disabled);
    }

    #[test]
    fn test_cell_round_trips_every_state() {
        let cell = StateCell::new(PipelineState::Idle);
        for state in [
            PipelineState::Disabled,
            PipelineState::Running,
            PipelineState::Draining,
            PipelineState::Stopped,
            PipelineState::Idle,
        ] {
            cell.set(state);
            assert_eq!(cell.get(), state);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(PipelineState::Draining.to_string(), "draining");
    }
}
