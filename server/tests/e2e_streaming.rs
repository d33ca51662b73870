//! End-to-end test: real listener, raw HTTP/1.1 client.
//! Verifies chunked transfer on the wire and the pause between chunks.

mod common;

use std::time::{Duration, Instant};

use lorem_core::SOURCE_TEXT;
use server::config::ServerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use common::*;

const TERMINATOR: &[u8] = b"\r\n0\r\n\r\n";

async fn spawn_server(config: ServerConfig) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_test_app_with(config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Split a raw response into its head and its de-chunked body pieces.
fn parse_chunked(raw: &[u8]) -> (String, Vec<String>) {
    let text = String::from_utf8(raw.to_vec()).expect("utf-8 response");
    let (head, mut rest) = text.split_once("\r\n\r\n").expect("header terminator");

    let mut chunks = Vec::new();
    loop {
        let (size_line, after) = rest.split_once("\r\n").expect("chunk size line");
        let size = usize::from_str_radix(size_line.trim(), 16).expect("hex chunk size");
        if size == 0 {
            break;
        }
        chunks.push(after[..size].to_string());
        rest = &after[size + 2..];
    }
    (head.to_string(), chunks)
}

async fn post_raw(addr: std::net::SocketAddr, body: &str) -> (Vec<u8>, Duration) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /chat-test HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let start = Instant::now();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if raw.ends_with(TERMINATOR) || raw.ends_with(b"\r\n\r\n0\r\n\r\n") {
                break;
            }
        }
    })
    .await
    .expect("response should finish");
    (raw, start.elapsed())
}

#[tokio::test]
async fn test_chunked_stream_over_tcp() {
    let addr = spawn_server(ServerConfig {
        chunk_delay_ms: 50,
        ..test_config()
    })
    .await;

    let (raw, elapsed) = post_raw(addr, r#"{"length": 250, "chunkSize": 100}"#).await;
    let (head, chunks) = parse_chunked(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    let head = head.to_ascii_lowercase();
    assert!(head.contains("content-type: text/event-stream"));
    assert!(head.contains("transfer-encoding: chunked"));
    assert!(head.contains("cache-control: no-cache"));
    assert!(head.contains("netlify-cdn-cache-control: public, max-age=0, must-revalidate"));
    assert!(head.contains("connection: keep-alive"));
    assert!(head.contains("x-request-id: "));

    let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert_eq!(chunks.concat(), SOURCE_TEXT[..250]);

    // One pause follows every chunk before the body ends.
    assert!(elapsed >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_concurrent_streams_are_independent() {
    let addr = spawn_server(ServerConfig {
        chunk_delay_ms: 30,
        ..test_config()
    })
    .await;

    let short = tokio::spawn(post_raw(addr, r#"{"length": 20, "chunkSize": 10}"#));
    let long = tokio::spawn(post_raw(addr, r#"{"length": 500, "chunkSize": 50}"#));

    let (short_raw, _) = short.await.unwrap();
    let (long_raw, _) = long.await.unwrap();

    let (_, short_chunks) = parse_chunked(&short_raw);
    let (_, long_chunks) = parse_chunked(&long_raw);
    assert_eq!(short_chunks.concat(), SOURCE_TEXT[..20]);
    assert_eq!(long_chunks.len(), 10);
    assert_eq!(long_chunks.concat(), SOURCE_TEXT[..500]);
}
