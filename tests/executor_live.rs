//! Executor over the real reqwest transport against a local one-shot server.
//!
//! The server accepts a single connection, captures the raw request and
//! replies with a canned response, so no external network is involved.

use std::time::Duration;

use dispatch::network::Executor;
use dispatch::parse;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\n\
Content-Type: application/json\r\n\
X-Multi: a\r\n\
X-Multi: b\r\n\
Content-Length: 19\r\n\
Connection: close\r\n\
\r\n\
{\"error\":\"missing\"}";

const CREATED: &str = "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

fn executor() -> Executor<dispatch::ReqwestTransport> {
    Executor::with_timeout(Duration::from_secs(5)).unwrap()
}

/// Serve `response` to the first connection; the handle yields the raw request
async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });
    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn get_without_body_returns_flattened_response() {
    let (base, server) = serve_once(NOT_FOUND).await;

    let result = executor()
        .execute("GET", &format!("{}/items/7", base), "")
        .await;
    let request = server.await.unwrap().to_lowercase();

    assert!(request.starts_with("get /items/7 http/1.1"), "{request}");
    assert!(!request.contains("content-type:"), "{request}");

    assert_eq!(result.error, None);
    assert_eq!(result.status, 404);
    assert_eq!(result.body, "{\"error\":\"missing\"}");
    assert_eq!(result.headers["content-type"], "application/json");
    assert_eq!(result.headers["x-multi"], "a, b");
}

#[tokio::test]
async fn post_with_body_sends_json_content_type() {
    let (base, server) = serve_once(CREATED).await;

    let result = executor()
        .execute("POST", &format!("{}/notes", base), "plain words")
        .await;
    let request = server.await.unwrap();

    assert!(request.to_lowercase().contains("content-type: application/json"), "{request}");
    assert!(request.ends_with("\r\n\r\nplain words"), "{request}");
    assert_eq!(result.status, 201);
    assert_eq!(result.body, "");
}

#[tokio::test]
async fn parsed_block_headers_reach_the_server() {
    let (base, server) = serve_once(CREATED).await;
    let document = format!(
        "### Create\nPUT {}/things/1\nX-Api-Key: secret\n\n{{\"n\": 1}}\n",
        base
    );
    let blocks = parse(&document);
    assert_eq!(blocks.len(), 1);

    let result = executor().execute_block(&blocks[0]).await;
    let request = server.await.unwrap().to_lowercase();

    assert!(request.starts_with("put /things/1 http/1.1"), "{request}");
    assert!(request.contains("x-api-key: secret"), "{request}");
    assert!(request.contains("content-type: application/json"), "{request}");
    assert!(request.ends_with("{\"n\": 1}"), "{request}");
    assert_eq!(result.status, 201);
}

#[tokio::test]
async fn refused_connection_is_captured_as_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = executor().execute("GET", &format!("http://{}/", addr), "").await;

    assert!(result.error.is_some());
    assert_eq!(result.status, 0);
    assert!(result.headers.is_empty());
    assert!(result.body.is_empty());
}

#[tokio::test]
async fn malformed_url_has_no_timing() {
    let result = executor().execute("GET", "::not-a-url::", "").await;
    assert!(result.error.is_some());
    assert_eq!(result.duration_millis, 0);
}
