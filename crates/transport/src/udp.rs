//! UDP delivery: one encoded record per datagram

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::TransportError;

/// Send buffer requested for the datagram socket
const SEND_BUFFER_SIZE: usize = 256 * 1024;

/// Connected UDP socket towards the drain
#[derive(Debug)]
pub(crate) struct UdpSender {
    address: String,
    max_datagram_size: usize,
    socket: Option<UdpSocket>,
}

impl UdpSender {
    pub(crate) fn new(address: impl Into<String>, max_datagram_size: usize) -> Self {
        Self {
            address: address.into(),
            max_datagram_size,
            socket: None,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Resolve the drain and bind a local socket connected to it
    pub(crate) async fn connect(&mut self, connect_timeout: Duration) -> Result<(), TransportError> {
        let resolved = timeout(connect_timeout, tokio::net::lookup_host(self.address.as_str()))
            .await
            .map_err(|_| TransportError::Timeout(connect_timeout))?
            .map_err(|e| self.connect_error(e))?
            .next()
            .ok_or_else(|| {
                self.connect_error(io::Error::new(
                    io::ErrorKind::NotFound,
                    "address resolved to nothing",
                ))
            })?;

        let socket = create_socket(resolved).map_err(|e| self.connect_error(e))?;
        self.socket = Some(socket);

        tracing::debug!(address = %self.address, peer = %resolved, "udp drain socket ready");
        Ok(())
    }

    /// Send one datagram
    ///
    /// Records above the configured ceiling are still attempted; only an OS
    /// rejection turns them into [`TransportError::Oversize`].
    pub(crate) async fn send(
        &mut self,
        payload: &[u8],
        write_timeout: Duration,
    ) -> Result<usize, TransportError> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(TransportError::Write(io::Error::new(
                io::ErrorKind::NotConnected,
                "no socket for drain",
            )));
        };

        let oversize = payload.len() > self.max_datagram_size;
        if oversize {
            tracing::warn!(
                size = payload.len(),
                limit = self.max_datagram_size,
                "record exceeds datagram ceiling, sending anyway"
            );
        }

        match timeout(write_timeout, socket.send(payload)).await {
            Ok(Ok(sent)) => Ok(sent),
            Ok(Err(e)) if oversize || is_message_too_long(&e) => Err(TransportError::Oversize {
                size: payload.len(),
                limit: self.max_datagram_size,
                source: e,
            }),
            Ok(Err(e)) => {
                // ICMP errors surface on the next send; start over with a fresh socket
                self.socket = None;
                Err(TransportError::Write(e))
            }
            Err(_) => Err(TransportError::Timeout(write_timeout)),
        }
    }

    pub(crate) fn close(&mut self) {
        self.socket = None;
    }

    fn connect_error(&self, source: io::Error) -> TransportError {
        TransportError::Connect {
            address: self.address.clone(),
            source,
        }
    }
}

fn create_socket(peer: SocketAddr) -> io::Result<UdpSocket> {
    let (domain, local): (Domain, SocketAddr) = if peer.is_ipv4() {
        (Domain::IPV4, (Ipv4Addr::UNSPECIFIED, 0).into())
    } else {
        (Domain::IPV6, (Ipv6Addr::UNSPECIFIED, 0).into())
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if let Err(e) = socket.set_send_buffer_size(SEND_BUFFER_SIZE) {
        tracing::warn!(
            error = %e,
            requested_size = SEND_BUFFER_SIZE,
            "failed to set UDP SO_SNDBUF"
        );
    }

    socket.bind(&local.into())?;
    socket.connect(&peer.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

/// EMSGSIZE on Linux and macOS
fn is_message_too_long(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(90) | Some(40))
}
