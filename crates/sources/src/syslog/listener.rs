use std::future::pending;
use std::io;
use std::net::SocketAddr;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use socket2::{Domain, Protocol, Socket, Type};
use sysfwd_config::SocketSourceConfig;
use sysfwd_metrics::SourceMetrics;
use sysfwd_record::{Record, decode_local};
use tokio::net::{UdpSocket, UnixDatagram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::SourceMetricsHandle;
use crate::common::trim_line_end;

// =============================================================================
// Errors
// =============================================================================

/// Syslog listener errors
#[derive(Debug, thiserror::Error)]
pub enum SyslogSourceError {
    /// Failed to bind a socket
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Socket path is occupied by something that is not a socket
    #[error("{} exists and is not a socket", path.display())]
    PathOccupied { path: PathBuf },
}

// =============================================================================
// Listener
// =============================================================================

/// Bound local syslog sockets
///
/// Binding happens in [`bind`](Self::bind) so startup errors surface before
/// any task is spawned; [`run`](Self::run) consumes the listener.
pub struct SyslogListener {
    hostname: String,
    max_message_size: usize,
    unix: Option<UnixDatagram>,
    unix_path: Option<PathBuf>,
    udp: Option<UdpSocket>,
    unix_metrics: Arc<SourceMetrics>,
    udp_metrics: Arc<SourceMetrics>,
}

impl SyslogListener {
    /// Bind the configured sockets
    ///
    /// `hostname` fills records whose datagram carries none.
    pub fn bind(
        config: &SocketSourceConfig,
        hostname: impl Into<String>,
    ) -> Result<Self, SyslogSourceError> {
        let (unix, unix_path) = match &config.path {
            Some(path) => (Some(bind_unix(path)?), Some(path.clone())),
            None => (None, None),
        };

        let udp = match &config.udp_address {
            Some(address) => Some(bind_udp(address, config.recv_buffer_size)?),
            None => None,
        };

        Ok(Self {
            hostname: hostname.into(),
            max_message_size: config.max_message_size,
            unix,
            unix_path,
            udp,
            unix_metrics: Arc::new(SourceMetrics::new()),
            udp_metrics: Arc::new(SourceMetrics::new()),
        })
    }

    /// Local address of the UDP socket, if one is bound
    pub fn udp_local_addr(&self) -> Option<SocketAddr> {
        self.udp.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Metrics handles, one per bound socket
    pub fn metrics_handles(&self) -> Vec<SourceMetricsHandle> {
        let mut handles = Vec::with_capacity(2);
        if self.unix.is_some() {
            handles.push(SourceMetricsHandle::new(
                "unix_socket",
                Arc::clone(&self.unix_metrics),
            ));
        }
        if self.udp.is_some() {
            handles.push(SourceMetricsHandle::new(
                "udp_socket",
                Arc::clone(&self.udp_metrics),
            ));
        }
        handles
    }

    /// Receive until cancelled or the coordinator goes away
    pub async fn run(self, sender: mpsc::Sender<Record>, cancel: CancellationToken) {
        tracing::info!(
            unix = ?self.unix_path,
            udp = ?self.udp_local_addr(),
            "syslog listener started"
        );

        // One spare byte: a datagram that fills it was cut short by recv
        let mut unix_buf = vec![0u8; self.max_message_size + 1];
        let mut udp_buf = vec![0u8; self.max_message_size + 1];

        loop {
            let (received, metrics, source) = tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                result = recv_unix(self.unix.as_ref(), &mut unix_buf) => {
                    (result.map(|n| &unix_buf[..n]), &self.unix_metrics, "unix_socket")
                }

                result = recv_udp(self.udp.as_ref(), &mut udp_buf) => {
                    (result.map(|n| &udp_buf[..n]), &self.udp_metrics, "udp_socket")
                }
            };

            let datagram = match received {
                Ok(datagram) => datagram,
                Err(e) => {
                    metrics.record_error();
                    tracing::debug!(source, error = %e, "syslog recv error");
                    continue;
                }
            };

            if trim_line_end(datagram).is_empty() {
                continue;
            }
            metrics.record_received(datagram.len() as u64);

            if datagram.len() > self.max_message_size {
                metrics.record_malformed();
                tracing::debug!(
                    source,
                    limit = self.max_message_size,
                    "dropping datagram larger than max_message_size"
                );
                continue;
            }

            let now: DateTime<FixedOffset> = Local::now().into();
            let record = match decode_local(datagram, now, &self.hostname) {
                Ok(record) => record,
                Err(e) => {
                    metrics.record_malformed();
                    tracing::debug!(source, error = %e, "dropping malformed datagram");
                    continue;
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = sender.send(record) => {
                    if sent.is_err() {
                        tracing::debug!("record channel closed");
                        break;
                    }
                }
            }
        }

        if let Some(path) = &self.unix_path {
            let _ = std::fs::remove_file(path);
        }

        tracing::info!(
            unix_received = self.unix_metrics.snapshot().messages_received,
            udp_received = self.udp_metrics.snapshot().messages_received,
            "syslog listener stopped"
        );
    }
}

async fn recv_unix(socket: Option<&UnixDatagram>, buf: &mut [u8]) -> io::Result<usize> {
    match socket {
        Some(socket) => socket.recv(buf).await,
        None => pending().await,
    }
}

async fn recv_udp(socket: Option<&UdpSocket>, buf: &mut [u8]) -> io::Result<usize> {
    match socket {
        Some(socket) => socket.recv_from(buf).await.map(|(n, _)| n),
        None => pending().await,
    }
}

// =============================================================================
// Socket setup
// =============================================================================

fn bind_unix(path: &Path) -> Result<UnixDatagram, SyslogSourceError> {
    let bind_error = |source: io::Error| SyslogSourceError::Bind {
        address: path.display().to_string(),
        source,
    };

    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            tracing::debug!(path = %path.display(), "removing stale socket");
            std::fs::remove_file(path).map_err(bind_error)?;
        }
        Ok(_) => {
            return Err(SyslogSourceError::PathOccupied {
                path: path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(bind_error(e)),
    }

    let socket = UnixDatagram::bind(path).map_err(bind_error)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666)).map_err(bind_error)?;
    Ok(socket)
}

fn bind_udp(address: &str, recv_buffer_size: usize) -> Result<UdpSocket, SyslogSourceError> {
    let bind_error = |source: io::Error| SyslogSourceError::Bind {
        address: address.to_string(),
        source,
    };

    let addr: SocketAddr = address.parse().map_err(|_| {
        bind_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid socket address",
        ))
    })?;

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let create = || -> io::Result<UdpSocket> {
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;

        if let Err(e) = socket.set_recv_buffer_size(recv_buffer_size) {
            tracing::warn!(
                error = %e,
                requested_size = recv_buffer_size,
                "failed to set UDP SO_RCVBUF"
            );
        }

        socket.bind(&addr.into())?;
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        UdpSocket::from_std(std_socket)
    };

    create().map_err(bind_error)
}

#[cfg(test)]
#[path = "listener_test.rs"]
mod listener_test;
