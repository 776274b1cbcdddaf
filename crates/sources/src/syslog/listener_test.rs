use super::*;
use std::time::Duration;
use sysfwd_metrics::SourceMetricsProvider;
use sysfwd_record::Severity;
use tempfile::TempDir;

fn socket_config(path: Option<PathBuf>, udp_address: Option<&str>) -> SocketSourceConfig {
    SocketSourceConfig {
        path,
        udp_address: udp_address.map(String::from),
        ..Default::default()
    }
}

async fn recv_record(rx: &mut mpsc::Receiver<Record>) -> Record {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for record")
        .expect("channel closed")
}

// =============================================================================
// Binding
// =============================================================================

#[tokio::test]
async fn test_bind_sets_world_writable_mode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.sock");

    let listener = SyslogListener::bind(&socket_config(Some(path.clone()), None), "host").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o666);
    assert_eq!(listener.metrics_handles().len(), 1);
}

#[tokio::test]
async fn test_bind_replaces_stale_socket() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.sock");

    // Leftover from a previous run
    let stale = std::os::unix::net::UnixDatagram::bind(&path).unwrap();
    drop(stale);
    assert!(path.exists());

    assert!(SyslogListener::bind(&socket_config(Some(path.clone()), None), "host").is_ok());
}

#[tokio::test]
async fn test_bind_refuses_regular_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-a-socket");
    std::fs::write(&path, b"keep me").unwrap();

    let result = SyslogListener::bind(&socket_config(Some(path.clone()), None), "host");
    assert!(matches!(
        result,
        Err(SyslogSourceError::PathOccupied { .. })
    ));
    assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_bind_invalid_udp_address() {
    let result = SyslogListener::bind(&socket_config(None, Some("not-an-address")), "host");
    assert!(matches!(result, Err(SyslogSourceError::Bind { .. })));
}

// =============================================================================
// Receiving
// =============================================================================

#[tokio::test]
async fn test_unix_datagram_becomes_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.sock");

    let listener =
        SyslogListener::bind(&socket_config(Some(path.clone()), None), "cell-7").unwrap();
    let handles = listener.metrics_handles();

    let (tx, mut rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(listener.run(tx, cancel.clone()));

    let client = std::os::unix::net::UnixDatagram::unbound().unwrap();
    client
        .send_to(b"<14>Mar  1 10:00:00 vcap: test-rfc5424\n", &path)
        .unwrap();

    let record = recv_record(&mut rx).await;
    assert_eq!(record.message(), "test-rfc5424");
    assert_eq!(record.app_name(), Some("vcap"));
    assert_eq!(record.hostname(), Some("cell-7"));
    assert_eq!(record.severity(), Severity::Info);

    cancel.cancel();
    task.await.unwrap();

    assert_eq!(handles[0].snapshot().messages_received, 1);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_malformed_datagram_counted_and_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.sock");

    let listener = SyslogListener::bind(&socket_config(Some(path.clone()), None), "host").unwrap();
    let handles = listener.metrics_handles();

    let (tx, mut rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(listener.run(tx, cancel.clone()));

    let client = std::os::unix::net::UnixDatagram::unbound().unwrap();
    client.send_to(b"no priority here", &path).unwrap();
    client.send_to(b"<13>after: the bad one", &path).unwrap();

    // Datagrams arrive in order, so the good one proves the bad one was seen
    let record = recv_record(&mut rx).await;
    assert_eq!(record.message(), "the bad one");
    assert_eq!(handles[0].snapshot().messages_malformed, 1);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn test_oversize_datagram_dropped_not_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.sock");
    let config = SocketSourceConfig {
        max_message_size: 64,
        ..socket_config(Some(path.clone()), None)
    };

    let listener = SyslogListener::bind(&config, "host").unwrap();
    let handles = listener.metrics_handles();

    let (tx, mut rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(listener.run(tx, cancel.clone()));

    let client = std::os::unix::net::UnixDatagram::unbound().unwrap();
    let too_long = format!("<13>app: {}", "x".repeat(100));
    client.send_to(too_long.as_bytes(), &path).unwrap();
    let exact = format!("<13>app: {}", "y".repeat(55));
    assert_eq!(exact.len(), 64);
    client.send_to(exact.as_bytes(), &path).unwrap();

    let record = recv_record(&mut rx).await;
    assert_eq!(record.message(), "y".repeat(55));
    assert_eq!(handles[0].snapshot().messages_malformed, 1);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn test_udp_datagram_becomes_record() {
    let listener = SyslogListener::bind(&socket_config(None, Some("127.0.0.1:0")), "host").unwrap();
    let addr = listener.udp_local_addr().unwrap();
    let handles = listener.metrics_handles();
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].source_id(), "udp_socket");

    let (tx, mut rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(listener.run(tx, cancel.clone()));

    let message = "z".repeat(1025);
    let line = format!("<134>1 2024-05-01T10:00:00Z web app 42 - - {message}");
    let client = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    client.send_to(line.as_bytes(), addr).unwrap();

    let record = recv_record(&mut rx).await;
    assert_eq!(record.message(), message);
    assert_eq!(record.hostname(), Some("web"));
    assert_eq!(record.proc_id(), Some("42"));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn test_stops_when_channel_closed() {
    let listener = SyslogListener::bind(&socket_config(None, Some("127.0.0.1:0")), "host").unwrap();
    let addr = listener.udp_local_addr().unwrap();

    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let task = tokio::spawn(listener.run(tx, CancellationToken::new()));

    let client = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    client.send_to(b"<13>tag: hello", addr).unwrap();

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}
