//! Configuration validation
//!
//! Only runs when forwarding is enabled; a disabled agent accepts an
//! otherwise incomplete config. Checks:
//! - The drain address is present and has a port
//! - At least one source is enabled
//! - Sizes and intervals are usable

use crate::Config;
use crate::drain::MAX_UDP_PAYLOAD;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }
    validate_drain(config)?;
    validate_sources(config)?;
    validate_pipeline(config)?;
    if config.metrics.enabled && config.metrics.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "metrics",
            "interval",
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn validate_drain(config: &Config) -> Result<()> {
    let drain = &config.drain;
    if drain.address.is_empty() {
        return Err(ConfigError::missing_field("drain", "address"));
    }

    match drain.address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
        _ => {
            return Err(ConfigError::invalid_value(
                "drain",
                "address",
                format!("'{}' must be host:port", drain.address),
            ));
        }
    }

    if drain.max_datagram_size == 0 || drain.max_datagram_size > MAX_UDP_PAYLOAD {
        return Err(ConfigError::invalid_value(
            "drain",
            "max_datagram_size",
            format!("must be between 1 and {MAX_UDP_PAYLOAD}"),
        ));
    }

    if drain.retry_interval > drain.max_backoff {
        return Err(ConfigError::invalid_value(
            "drain",
            "max_backoff",
            "must not be shorter than retry_interval",
        ));
    }

    Ok(())
}

fn validate_sources(config: &Config) -> Result<()> {
    let socket = &config.sources.socket;
    let files = &config.sources.files;

    let socket_active =
        socket.enabled && (socket.path.is_some() || socket.udp_address.is_some());
    if !socket_active && !files.enabled {
        return Err(ConfigError::NoSourcesEnabled);
    }

    if socket.enabled && socket.max_message_size == 0 {
        return Err(ConfigError::invalid_value(
            "sources.socket",
            "max_message_size",
            "must be greater than zero",
        ));
    }

    if files.enabled {
        if files.root.as_os_str().is_empty() {
            return Err(ConfigError::missing_field("sources.files", "root"));
        }
        if files.patterns.is_empty() || files.patterns.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::invalid_value(
                "sources.files",
                "patterns",
                "must list at least one non-empty pattern",
            ));
        }
        if files.poll_interval.is_zero() || files.discovery_interval.is_zero() {
            return Err(ConfigError::invalid_value(
                "sources.files",
                "poll_interval",
                "intervals must be greater than zero",
            ));
        }
        if files.read_chunk_size == 0 {
            return Err(ConfigError::invalid_value(
                "sources.files",
                "read_chunk_size",
                "must be greater than zero",
            ));
        }
    }

    Ok(())
}

fn validate_pipeline(config: &Config) -> Result<()> {
    if config.pipeline.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "queue_size",
            "must be greater than zero",
        ));
    }
    Ok(())
}
