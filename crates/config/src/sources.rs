//! Source configuration types
//!
//! Two inputs feed the agent: the local syslog socket and a directory tree of
//! plain-text log files.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Container for all source configurations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Local syslog socket
    pub socket: SocketSourceConfig,

    /// Log file tailer
    pub files: FileSourceConfig,
}

/// Local syslog socket configuration
///
/// # Example
///
/// ```toml
/// [sources.socket]
/// path = "/dev/log"
/// udp_address = "127.0.0.1:5514"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocketSourceConfig {
    /// Whether this source is enabled
    /// Default: true
    pub enabled: bool,

    /// Unix datagram socket path; unset disables the Unix socket
    /// Default: /dev/log
    pub path: Option<PathBuf>,

    /// Additional UDP listen address for local syslog datagrams
    /// Default: none
    pub udp_address: Option<String>,

    /// Largest datagram accepted; longer ones are dropped as malformed
    /// rather than forwarded truncated
    /// Default: 64KB
    pub max_message_size: usize,

    /// SO_RCVBUF for the sockets
    /// Default: 4MB
    pub recv_buffer_size: usize,
}

impl Default for SocketSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: Some(PathBuf::from("/dev/log")),
            udp_address: None,
            max_message_size: 64 * 1024,
            recv_buffer_size: 4 * 1024 * 1024,
        }
    }
}

/// Log file tailer configuration
///
/// # Example
///
/// ```toml
/// [sources.files]
/// root = "/var/vcap/sys/log"
/// patterns = ["*.log"]
/// discovery_interval = "5s"
/// poll_interval = "250ms"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSourceConfig {
    /// Whether this source is enabled
    /// Default: true
    pub enabled: bool,

    /// Directory tree to watch (recursive)
    /// Default: /var/vcap/sys/log
    pub root: PathBuf,

    /// File name patterns; `*` matches any run of characters
    /// Default: ["*.log"]
    pub patterns: Vec<String>,

    /// How often the tree is rescanned for new files
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub discovery_interval: Duration,

    /// How often watched files are checked for new bytes
    /// Default: 250ms
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Start files present at startup at their end instead of offset 0
    /// Default: true
    pub start_at_end: bool,

    /// Bytes read from one file per poll
    /// Default: 64KB
    pub read_chunk_size: usize,
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: PathBuf::from("/var/vcap/sys/log"),
            patterns: vec!["*.log".to_string()],
            discovery_interval: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            start_at_end: true,
            read_chunk_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourcesConfig::default();
        assert!(config.socket.enabled);
        assert_eq!(config.socket.path, Some(PathBuf::from("/dev/log")));
        assert!(config.socket.udp_address.is_none());
        assert!(config.files.enabled);
        assert_eq!(config.files.root, PathBuf::from("/var/vcap/sys/log"));
        assert_eq!(config.files.patterns, vec!["*.log"]);
        assert!(config.files.start_at_end);
    }

    #[test]
    fn test_deserialize() {
        let toml = r#"
[socket]
path = "/tmp/sysfwd.sock"
udp_address = "127.0.0.1:5514"

[files]
root = "/tmp/logs"
patterns = ["*.log", "*.txt"]
poll_interval = "100ms"
start_at_end = false
"#;
        let config: SourcesConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.socket.path, Some(PathBuf::from("/tmp/sysfwd.sock")));
        assert_eq!(config.socket.udp_address.as_deref(), Some("127.0.0.1:5514"));
        assert_eq!(config.files.patterns.len(), 2);
        assert_eq!(config.files.poll_interval, Duration::from_millis(100));
        assert!(!config.files.start_at_end);
    }
}
