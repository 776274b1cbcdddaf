use super::*;
use crate::FrameDecoder;
use bytes::Bytes;
use std::time::Duration;
use sysfwd_config::Framing;
use sysfwd_record::{RecordBuilder, StructuredElement};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, UdpSocket};

fn record(message: impl Into<String>) -> Record {
    RecordBuilder::new(message)
        .hostname("cell-1")
        .app_name("test")
        .element(
            StructuredElement::new("instance@47450")
                .param("deployment", "cf")
                .param("az", "z1"),
        )
        .build()
        .unwrap()
}

fn fast_retries(config: TransportConfig) -> TransportConfig {
    config
        .with_connection_timeout(Duration::from_millis(500))
        .with_write_timeout(Duration::from_millis(500))
        .with_retry_interval(Duration::from_millis(10))
        .with_max_backoff(Duration::from_millis(20))
}

async fn read_frames(listener: TcpListener, framing: Framing, count: usize) -> Vec<Bytes> {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut decoder = FrameDecoder::new(framing);
    let mut frames = Vec::new();
    let mut buf = vec![0u8; 4096];

    while frames.len() < count {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        decoder.extend(&buf[..n]);
        while let Some(frame) = decoder.decode().unwrap() {
            frames.push(frame);
        }
    }
    frames
}

// =============================================================================
// TCP
// =============================================================================

#[tokio::test]
async fn test_tcp_large_message_is_one_frame() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reader = tokio::spawn(read_frames(listener, Framing::OctetCounting, 1));

    let message = "m".repeat(1025);
    let rec = record(message.clone());
    let mut transport = DrainTransport::new(TransportConfig::new(
        addr.to_string(),
        TransportProtocol::Tcp,
    ));

    let written = transport.send(&rec).await.unwrap();
    let frames = reader.await.unwrap();

    let encoded = rec.encode();
    assert_eq!(frames.len(), 1);
    assert_eq!(&frames[0][..], &encoded[..]);
    assert!(frames[0].ends_with(message.as_bytes()));
    assert_eq!(written, encoded.len().to_string().len() + 1 + encoded.len());

    let snapshot = transport.metrics().snapshot();
    assert_eq!(snapshot.records_sent, 1);
    assert_eq!(snapshot.connects, 1);
    assert_eq!(snapshot.retries, 0);
}

#[tokio::test]
async fn test_tcp_non_transparent_escapes_multiline() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reader = tokio::spawn(read_frames(listener, Framing::NonTransparent, 2));

    let config = TransportConfig::new(addr.to_string(), TransportProtocol::Tcp)
        .with_framing(Framing::NonTransparent);
    let mut transport = DrainTransport::new(config);

    transport.send(&record("first line\nsecond line")).await.unwrap();
    transport.send(&record("plain")).await.unwrap();

    let frames = reader.await.unwrap();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].ends_with(b"first line#012second line"));
    assert!(frames[1].ends_with(b"plain"));
}

#[tokio::test]
async fn test_tcp_retries_exhausted() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = fast_retries(TransportConfig::new(addr.to_string(), TransportProtocol::Tcp))
        .with_retry_attempts(2);
    let mut transport = DrainTransport::new(config);

    let err = transport.send(&record("lost")).await.unwrap_err();
    match err {
        TransportError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("unexpected error: {other}"),
    }

    let snapshot = transport.metrics().snapshot();
    assert_eq!(snapshot.retries, 2);
    assert_eq!(snapshot.send_errors, 3);
    assert_eq!(snapshot.records_sent, 0);
}

#[tokio::test]
async fn test_tcp_connect_up_front() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut transport = DrainTransport::new(TransportConfig::new(
        addr.to_string(),
        TransportProtocol::Tcp,
    ));
    assert!(!transport.is_connected());
    transport.connect().await.unwrap();
    assert!(transport.is_connected());

    transport.close().await;
    assert!(!transport.is_connected());
}

// =============================================================================
// UDP
// =============================================================================

#[tokio::test]
async fn test_udp_large_message_is_one_datagram() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = receiver.local_addr().unwrap();

    let rec = record("u".repeat(1025));
    let mut transport = DrainTransport::new(TransportConfig::new(
        addr.to_string(),
        TransportProtocol::Udp,
    ));

    let written = transport.send(&rec).await.unwrap();

    let mut buf = vec![0u8; 65_536];
    let n = receiver.recv(&mut buf).await.unwrap();
    assert_eq!(n, written);
    assert_eq!(&buf[..n], &rec.encode()[..]);
    assert_eq!(transport.metrics().snapshot().records_sent, 1);
}

#[tokio::test]
async fn test_udp_above_ceiling_still_attempted() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = receiver.local_addr().unwrap();

    let config =
        TransportConfig::new(addr.to_string(), TransportProtocol::Udp).with_max_datagram_size(512);
    let mut transport = DrainTransport::new(config);

    let rec = record("o".repeat(1025));
    transport.send(&rec).await.unwrap();

    let mut buf = vec![0u8; 65_536];
    let n = receiver.recv(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], &rec.encode()[..]);
}

#[tokio::test]
async fn test_udp_rejected_datagram_not_retried() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = receiver.local_addr().unwrap();

    let config = fast_retries(TransportConfig::new(addr.to_string(), TransportProtocol::Udp));
    let mut transport = DrainTransport::new(config);

    let err = transport.send(&record("x".repeat(70_000))).await.unwrap_err();
    assert!(matches!(err, TransportError::Oversize { .. }));
    assert!(!err.is_retryable());

    let snapshot = transport.metrics().snapshot();
    assert_eq!(snapshot.send_errors, 1);
    assert_eq!(snapshot.retries, 0);
}
