//! Drain transport: encode, frame, send with retry

use std::sync::Arc;

use bytes::BytesMut;
use sysfwd_config::TransportProtocol;
use sysfwd_metrics::DrainMetrics;
use sysfwd_record::Record;

use crate::framing::encode_frame;
use crate::tcp::TcpSender;
use crate::udp::UdpSender;
use crate::{TransportConfig, TransportError};

enum Connection {
    Udp(UdpSender),
    Tcp(TcpSender),
}

/// Delivers records to the drain over UDP or TCP
///
/// Owns its socket exclusively; callers serialize access through `&mut self`
/// (the [`DrainSink`](crate::DrainSink) worker is the only owner at runtime).
pub struct DrainTransport {
    config: Arc<TransportConfig>,
    connection: Connection,
    encoded: Vec<u8>,
    frame: BytesMut,
    metrics: Arc<DrainMetrics>,
}

impl DrainTransport {
    /// Create a transport; no connection is made until the first send
    pub fn new(config: TransportConfig) -> Self {
        let connection = match config.protocol {
            TransportProtocol::Udp => {
                Connection::Udp(UdpSender::new(&config.address, config.max_datagram_size))
            }
            TransportProtocol::Tcp => Connection::Tcp(TcpSender::new(
                &config.address,
                config.tcp_keepalive.then_some(config.tcp_keepalive_interval),
            )),
        };

        Self {
            config: Arc::new(config),
            connection,
            encoded: Vec::with_capacity(2048),
            frame: BytesMut::with_capacity(2048),
            metrics: Arc::new(DrainMetrics::new()),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Get the shared metrics
    pub fn metrics(&self) -> &Arc<DrainMetrics> {
        &self.metrics
    }

    /// Whether a socket is currently open
    pub fn is_connected(&self) -> bool {
        match &self.connection {
            Connection::Udp(udp) => udp.is_connected(),
            Connection::Tcp(tcp) => tcp.is_connected(),
        }
    }

    /// Open the socket now instead of on the first send
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        let connect_timeout = self.config.connection_timeout;
        match &mut self.connection {
            Connection::Udp(udp) => udp.connect(connect_timeout).await,
            Connection::Tcp(tcp) => {
                tcp.connect(connect_timeout).await?;
                self.metrics.record_connect();
                Ok(())
            }
        }
    }

    /// Send one record, retrying with exponential backoff
    ///
    /// Returns the number of bytes written on the wire (frame included).
    /// After `retry_attempts` retries the last error is wrapped in
    /// [`TransportError::RetriesExhausted`]; the caller decides whether to drop.
    pub async fn send(&mut self, record: &Record) -> Result<usize, TransportError> {
        self.encoded.clear();
        record.encode_into(&mut self.encoded);

        if matches!(self.connection, Connection::Tcp(_)) {
            self.frame.clear();
            encode_frame(self.config.framing, &self.encoded, &mut self.frame);
        }

        let mut last_error = String::new();

        for attempt in 0..=self.config.retry_attempts {
            if attempt > 0 {
                let wait = self.config.backoff(attempt - 1);
                self.metrics.record_retry();
                tracing::debug!(
                    drain = %self.config.address,
                    attempt = attempt + 1,
                    wait_ms = wait.as_millis() as u64,
                    "retrying send"
                );
                tokio::time::sleep(wait).await;
            }

            match self.send_once().await {
                Ok(written) => {
                    self.metrics.record_sent(written as u64);
                    return Ok(written);
                }
                Err(e) if !e.is_retryable() => {
                    self.metrics.record_error();
                    return Err(e);
                }
                Err(e) => {
                    self.metrics.record_error();
                    tracing::debug!(
                        drain = %self.config.address,
                        attempt = attempt + 1,
                        max_attempts = self.config.retry_attempts + 1,
                        error = %e,
                        "send attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(TransportError::RetriesExhausted {
            attempts: self.config.retry_attempts + 1,
            last_error,
        })
    }

    /// Close the socket; the next send reconnects
    pub async fn close(&mut self) {
        match &mut self.connection {
            Connection::Udp(udp) => udp.close(),
            Connection::Tcp(tcp) => tcp.close().await,
        }
    }

    async fn send_once(&mut self) -> Result<usize, TransportError> {
        let config = &self.config;
        match &mut self.connection {
            Connection::Udp(udp) => {
                if !udp.is_connected() {
                    udp.connect(config.connection_timeout).await?;
                }
                udp.send(&self.encoded, config.write_timeout).await
            }
            Connection::Tcp(tcp) => {
                if !tcp.is_connected() {
                    tcp.connect(config.connection_timeout).await?;
                    self.metrics.record_connect();
                }
                tcp.send(&self.frame, config.write_timeout).await
            }
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;
