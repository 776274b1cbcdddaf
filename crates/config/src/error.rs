use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Why a configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting forwarding cannot run without
    #[error("[{section}] {field} is required")]
    Missing {
        section: &'static str,
        field: &'static str,
    },

    #[error("[{section}] {field}: {reason}")]
    Invalid {
        section: &'static str,
        field: &'static str,
        reason: String,
    },

    /// Forwarding is enabled with nothing to forward
    #[error("no sources are enabled - enable sources.socket or sources.files")]
    NoSourcesEnabled,
}

impl ConfigError {
    pub fn missing_field(section: &'static str, field: &'static str) -> Self {
        Self::Missing { section, field }
    }

    pub fn invalid_value(
        section: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            section,
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_section() {
        assert_eq!(
            ConfigError::missing_field("drain", "address").to_string(),
            "[drain] address is required"
        );
        assert_eq!(
            ConfigError::invalid_value("pipeline", "queue_size", "must be greater than zero")
                .to_string(),
            "[pipeline] queue_size: must be greater than zero"
        );
    }

    #[test]
    fn test_read_error_names_path() {
        let err = ConfigError::Read {
            path: "/etc/sysfwd/config.toml".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "cannot read /etc/sysfwd/config.toml: denied");
    }
}
