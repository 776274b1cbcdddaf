//! sysfwd - Configuration
//!
//! One TOML file describes the whole agent. Every section may be omitted;
//! the only value without a usable default is `drain.address`.
//!
//! ```
//! use sysfwd_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[drain]\naddress = \"logs.example.com:514\"").unwrap();
//! assert_eq!(config.enabled_sources(), ["unix_socket", "files"]);
//! ```
//!
//! With `enabled = false` the file is accepted as long as it parses: the
//! agent will not bind, tail or connect anything, so nothing else needs to
//! be valid.

mod drain;
mod error;
mod filter;
mod instance;
mod logging;
mod metrics;
mod pipeline;
mod sources;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use drain::{DrainConfig, Framing, MAX_UDP_PAYLOAD, TransportProtocol};
pub use error::{ConfigError, Result};
pub use filter::{FilterConfig, FilterRuleConfig};
pub use instance::{DEFAULT_ENTERPRISE_NUMBER, InstanceConfig, MessageFormat};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use pipeline::PipelineConfig;
pub use sources::{FileSourceConfig, SocketSourceConfig, SourcesConfig};

use serde::Deserialize;

/// Top-level `config.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master switch; when false no listener, tailer or sender runs
    /// Default: true
    pub enabled: bool,

    /// The agent's own diagnostics
    pub log: LogConfig,

    pub metrics: MetricsConfig,

    /// Identity of this instance
    pub instance: InstanceConfig,

    /// Remote collector
    pub drain: DrainConfig,

    /// Inputs (socket, files)
    pub sources: SourcesConfig,

    /// Filter rules
    pub filter: FilterConfig,

    /// Channel sizes and shutdown timing
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            log: LogConfig::default(),
            metrics: MetricsConfig::default(),
            instance: InstanceConfig::default(),
            drain: DrainConfig::default(),
            sources: SourcesConfig::default(),
            filter: FilterConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Read, parse and validate `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&contents)
    }

    /// Cross-field checks; a no-op when forwarding is disabled
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Names of the inputs that will run
    pub fn enabled_sources(&self) -> Vec<&'static str> {
        let mut sources = Vec::new();
        if !self.enabled {
            return sources;
        }

        let socket = &self.sources.socket;
        if socket.enabled && socket.path.is_some() {
            sources.push("unix_socket");
        }
        if socket.enabled && socket.udp_address.is_some() {
            sources.push("udp_socket");
        }
        if self.sources.files.enabled {
            sources.push("files");
        }
        sources
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_disabled_config_uses_defaults() {
        let config = Config::from_str("enabled = false").unwrap();
        assert!(!config.enabled);
        assert!(config.enabled_sources().is_empty());
        assert_eq!(config.drain.retry_attempts, 5);
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::from_str("[drain]\naddress = \"127.0.0.1:514\"").unwrap();
        assert!(config.enabled);
        assert_eq!(config.instance.element_id(), "instance@47450");
        assert_eq!(config.enabled_sources(), vec!["unix_socket", "files"]);
        assert!(config.filter.rules.is_empty());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
enabled = true

[log]
level = "debug"
format = "json"

[metrics]
interval = "10s"

[instance]
director = "bosh"
deployment = "cf"
group = "router"
az = "z1"
id = "6c6c6f35"
index = 2
message_format = "job_index"

[drain]
address = "logs.example.com:6514"
transport = "udp"
retry_attempts = 2

[sources.socket]
path = "/tmp/log.sock"
udp_address = "127.0.0.1:5514"

[sources.files]
root = "/tmp/logs"
start_at_end = false

[[filter.rules]]
match = "contains"
value = "This is a DEBUG message that we filter out"
action = "drop"

[pipeline]
shutdown_grace = "2s"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.metrics.interval, Duration::from_secs(10));
        assert_eq!(config.instance.message_format, MessageFormat::JobIndex);
        assert_eq!(config.instance.index, 2);
        assert_eq!(config.drain.transport, TransportProtocol::Udp);
        assert_eq!(config.drain.retry_attempts, 2);
        assert_eq!(
            config.enabled_sources(),
            vec!["unix_socket", "udp_socket", "files"]
        );
        assert_eq!(config.filter.rules.len(), 1);
        assert_eq!(config.pipeline.shutdown_grace, Duration::from_secs(2));
    }

    #[test]
    fn test_unknown_message_format_fails() {
        let toml = r#"
[drain]
address = "127.0.0.1:514"

[instance]
message_format = "crazy-format"
"#;
        let err = Config::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("crazy-format"), "{err}");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_str("invalid { toml").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[drain]\naddress = \"127.0.0.1:514\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.drain.address, "127.0.0.1:514");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/nonexistent/sysfwd.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
