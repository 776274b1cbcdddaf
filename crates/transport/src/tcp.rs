//! TCP delivery of framed records

use std::io::{self, ErrorKind};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::TransportError;

/// Single TCP connection towards the drain
///
/// A failed or timed out write invalidates the connection; the caller
/// reconnects before the next attempt.
#[derive(Debug)]
pub(crate) struct TcpSender {
    address: String,
    keepalive: Option<Duration>,
    stream: Option<TcpStream>,
}

impl TcpSender {
    pub(crate) fn new(address: impl Into<String>, keepalive: Option<Duration>) -> Self {
        Self {
            address: address.into(),
            keepalive,
            stream: None,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Connect to the drain, replacing any existing connection
    pub(crate) async fn connect(&mut self, connect_timeout: Duration) -> Result<(), TransportError> {
        self.stream = None;

        let stream = match timeout(connect_timeout, TcpStream::connect(self.address.as_str())).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(TransportError::Connect {
                    address: self.address.clone(),
                    source: e,
                });
            }
            Err(_) => {
                return Err(TransportError::Connect {
                    address: self.address.clone(),
                    source: io::Error::new(ErrorKind::TimedOut, "connection timed out"),
                });
            }
        };

        // Non-fatal if it fails
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "failed to set TCP_NODELAY");
        }

        if let Some(interval) = self.keepalive {
            let keepalive = TcpKeepalive::new().with_time(interval);

            #[cfg(target_os = "linux")]
            let keepalive = keepalive.with_interval(interval);

            if let Err(e) = SockRef::from(&stream).set_tcp_keepalive(&keepalive) {
                tracing::debug!(error = %e, "failed to set TCP keep-alive");
            }
        }

        tracing::debug!(address = %self.address, "connected to drain");
        self.stream = Some(stream);
        Ok(())
    }

    /// Write one complete frame
    pub(crate) async fn send(
        &mut self,
        frame: &[u8],
        write_timeout: Duration,
    ) -> Result<usize, TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::Write(io::Error::new(
                ErrorKind::NotConnected,
                "no connection to drain",
            )));
        };

        let write_result = timeout(write_timeout, async {
            stream.write_all(frame).await?;
            stream.flush().await?;
            Ok::<(), io::Error>(())
        })
        .await;

        match write_result {
            Ok(Ok(())) => Ok(frame.len()),
            Ok(Err(e)) => {
                self.stream = None;
                Err(TransportError::Write(e))
            }
            Err(_) => {
                self.stream = None;
                Err(TransportError::Timeout(write_timeout))
            }
        }
    }

    /// Shut down the write half and drop the connection
    pub(crate) async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
