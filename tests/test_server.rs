//! End-to-end tests for the static file server over loopback sockets

use beacon::config::ServerConfig;
use beacon::http::parser::parse_response;
use beacon::http::response::SERVER_ID;
use beacon::server::{Dispatcher, FileAccessLog, MemoryAccessLog, Server, StaticFileResolver};
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
    fs::write(dir.path().join("style.css"), "p { color: red }").unwrap();
    dir
}

fn server_config(root: &TempDir) -> ServerConfig {
    ServerConfig {
        port: 0,
        static_root: root.path().to_path_buf(),
        read_timeout_ms: 500,
        ..ServerConfig::default()
    }
}

async fn start(cfg: &ServerConfig, log: Arc<MemoryAccessLog>) -> SocketAddr {
    let server = Server::bind(cfg, log).unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn roundtrip(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .unwrap()
        .unwrap();
    response
}

#[tokio::test]
async fn test_serves_index_html() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    let raw = roundtrip(addr, b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await;

    let expected = format!(
        "HTTP/1.1 200 OK\r\nServer: {}\r\nConnection: close\r\nContent-Type: text/html\r\n\r\n<html></html>",
        SERVER_ID
    );
    assert_eq!(String::from_utf8(raw).unwrap(), expected);
}

#[tokio::test]
async fn test_missing_file_returns_404() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    let raw = roundtrip(addr, b"GET /missing.txt HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let response = parse_response(&raw).unwrap();

    assert_eq!(response.status_code(), Some(404));
    assert_eq!(response.body, b"404 Not Found".to_vec());
    assert!(response.header("content-type").is_none());
}

#[tokio::test]
async fn test_root_serves_default_document() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    let raw = roundtrip(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let response = parse_response(&raw).unwrap();

    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.body, b"<html></html>".to_vec());
}

#[tokio::test]
async fn test_malformed_request_returns_500() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    let raw = roundtrip(addr, b"GARBAGE\r\n\r\n").await;
    let response = parse_response(&raw).unwrap();

    assert_eq!(response.status_code(), Some(500));
    assert_eq!(response.reason(), Some("Internal Server Error"));
    assert_eq!(response.body, b"Internal Server Error".to_vec());
}

#[tokio::test]
async fn test_empty_connection_is_closed_silently() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    assert!(response.is_empty());
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_request_split_across_writes() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /style.css HTTP/1.1\r\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream.write_all(b"Host: localhost\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = parse_response(&raw).unwrap();

    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.header("Content-Type"), Some("text/css"));
}

#[tokio::test]
async fn test_access_log_records_each_request() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let addr = start(&server_config(&root), log.clone()).await;

    roundtrip(addr, b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    roundtrip(addr, b"GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    let mut entries = log.entries();
    entries.sort_by_key(|entry| entry.status);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].method, "GET");
    assert_eq!(entries[0].path, "/index.html");
    assert_eq!(entries[0].status, 200);
    assert_eq!(entries[0].content_length, 13);
    assert!(entries[0].client.is_loopback());
    assert_eq!(entries[1].status, 404);
    assert_eq!(entries[1].content_length, b"404 Not Found".len());
}

#[tokio::test]
async fn test_concurrent_clients_beyond_worker_count() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let cfg = ServerConfig {
        workers: 2,
        max_connections: 16,
        ..server_config(&root)
    };
    let addr = start(&cfg, log.clone()).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        handles.push(tokio::spawn(roundtrip(
            addr,
            b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )));
    }

    for handle in handles {
        let raw = handle.await.unwrap();
        assert_eq!(parse_response(&raw).unwrap().status_code(), Some(200));
    }
    assert_eq!(log.entries().len(), 8);
}

#[tokio::test]
async fn test_dispatcher_over_in_memory_stream() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let dispatcher = Dispatcher::new(
        StaticFileResolver::new(root.path(), "index.html"),
        log.clone(),
        1024,
        Duration::from_millis(500),
    );

    let (mut client, server) = tokio::io::duplex(4096);
    client
        .write_all(b"GET /style.css HTTP/1.1\r\nHost: test\r\n\r\n")
        .await
        .unwrap();

    let peer: SocketAddr = "10.0.0.7:50000".parse().unwrap();
    dispatcher.handle(server, peer).await;

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    let response = parse_response(&raw).unwrap();

    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.body, b"p { color: red }".to_vec());
    assert_eq!(log.entries()[0].client.to_string(), "10.0.0.7");
}

#[tokio::test]
async fn test_overflowing_content_length_still_gets_response() {
    let root = site();
    let log = Arc::new(MemoryAccessLog::new());
    let dispatcher = Dispatcher::new(
        StaticFileResolver::new(root.path(), "index.html"),
        log.clone(),
        1024,
        Duration::from_millis(500),
    );

    let (mut client, server) = tokio::io::duplex(4096);
    let request = format!(
        "GET /style.css HTTP/1.1\r\nHost: test\r\nContent-Length: {}\r\n\r\n",
        usize::MAX
    );
    client.write_all(request.as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();

    let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
    tokio::spawn(async move { dispatcher.handle(server, peer).await })
        .await
        .unwrap();

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    let response = parse_response(&raw).unwrap();

    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.body, b"p { color: red }".to_vec());

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, 200);
}

#[tokio::test]
async fn test_file_access_log_appends_lines() {
    let root = site();
    let log_dir = tempfile::tempdir().unwrap();
    let file_log = Arc::new(FileAccessLog::open(&log_dir.path().join("nested")).unwrap());

    let server = Server::bind(&server_config(&root), file_log.clone()).unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    roundtrip(addr, b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    roundtrip(addr, b"GET /missing HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    let contents = fs::read_to_string(file_log.path()).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.contains("\"GET /index.html HTTP/1.1\" 200 13")));
    assert!(lines.iter().any(|l| l.contains("\"GET /missing HTTP/1.1\" 404 13")));
    assert!(lines.iter().all(|l| l.starts_with("127.0.0.1 - - [")));
}
