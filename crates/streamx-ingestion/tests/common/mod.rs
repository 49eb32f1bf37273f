//! Shared test helpers for ingestion integration tests.
#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use streamx_core::{CloudEvent, JsonEventCodec};
use streamx_ingestion::{INGESTION_ENDPOINT_PATH, RestPublisher, StreamxClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Start a mock ingestion server answering every POST to the default
/// ingestion path with `response`.
pub async fn start_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGESTION_ENDPOINT_PATH))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

/// Build a client pointing at `server` with default settings.
pub fn client(server: &MockServer) -> StreamxClient {
    StreamxClient::builder(server.uri()).build().unwrap()
}

/// Create a publisher from a default client pointing at `server`.
pub fn publisher(server: &MockServer) -> RestPublisher {
    client(server).new_publisher()
}

/// Return every request the server received.
pub async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

/// Assert that `request` is an ingestion POST to `uri_path` carrying exactly
/// the encoding of `expected` and each of `headers`.
pub fn assert_ingestion_request(
    request: &Request,
    uri_path: &str,
    expected: &[CloudEvent],
    headers: &[(&str, &str)],
) {
    let serialized = JsonEventCodec::new().encode(expected).unwrap();

    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.url.path(), uri_path);
    assert_eq!(String::from_utf8_lossy(&request.body), serialized.body());
    assert_eq!(header(request, "Content-Type"), Some(serialized.content_type()));
    for (name, value) in headers {
        assert_eq!(header(request, name), Some(*value), "header {name}");
    }
}

/// Look up a request header as text.
pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
}

/// Start a bare HTTP server answering one request with `status_line` and an
/// empty body. Returns its base URL.
pub async fn start_status_line_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..read]);
            if request_complete(&received) {
                break;
            }
        }
        let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{address}")
}

fn request_complete(received: &[u8]) -> bool {
    let Some(header_end) = received.windows(4).position(|window| window == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&received[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    received.len() >= header_end + 4 + content_length
}
