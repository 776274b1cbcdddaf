//! Pipeline error types

use thiserror::Error;

use sysfwd_filter::FilterError;

/// Pipeline errors
///
/// All variants are fatal: they are returned from [`Pipeline::build`] or
/// [`Pipeline::start`] before any record flows.
///
/// [`Pipeline::build`]: crate::Pipeline::build
/// [`Pipeline::start`]: crate::Pipeline::start
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filter rules failed to load
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A component could not be started
    #[error("failed to start {component}: {source}")]
    Startup {
        component: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PipelineError {
    /// Wrap a component startup failure
    pub fn startup(
        component: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Startup {
            component,
            source: source.into(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = PipelineError::startup("files", io::Error::other("root missing"));
        assert_eq!(err.to_string(), "failed to start files: root missing");

        let err = PipelineError::from(FilterError::invalid_rule(2, "unknown match kind"));
        assert!(err.to_string().contains("unknown match kind"));
    }
}
