//! Default transport backed by `reqwest`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::error::{ClientError, Result};
use crate::transport::{
    HttpTransport, ResponseBody, TransportError, TransportRequest, TransportResponse,
};

/// Settings for the default HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout applied to every request unless overridden per call.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("streamx-ingestion-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `HttpTransport` over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built
    /// with the provided settings.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wraps a caller-provided HTTP client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let start_time = Instant::now();

        let mut http_request = self.client.post(request.uri).body(request.body);
        for (name, value) in &request.headers {
            http_request = http_request.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            http_request = http_request.timeout(timeout);
        }

        let response = http_request.send().await.map_err(classify)?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            duration_ms = start_time.elapsed().as_millis(),
            "Received ingestion response"
        );

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: reason_phrase(&response),
            headers: extract_headers(response.headers()),
            body: Box::new(ReqwestBody(response)),
        })
    }
}

#[derive(Debug)]
struct ReqwestBody(reqwest::Response);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn read_all(self: Box<Self>) -> std::result::Result<Bytes, TransportError> {
        self.0
            .bytes()
            .await
            .map_err(|e| TransportError::body(e.to_string()).caused_by(e))
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    let message = error.to_string();
    let classified = if error.is_timeout() {
        TransportError::timeout(message)
    } else if error.is_connect() {
        TransportError::connect(message)
    } else if error.is_body() || error.is_decode() {
        TransportError::body(message)
    } else {
        TransportError::other(message)
    };
    classified.caused_by(error)
}

/// The reason phrase the server sent, or the canonical one for the status
/// when the server used it.
fn reason_phrase(response: &reqwest::Response) -> String {
    match response.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Extracts headers with textual values; the first value wins.
fn extract_headers(header_map: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    for (key, value) in header_map {
        if let Ok(value_str) = value.to_str() {
            headers
                .entry(key.to_string())
                .or_insert_with(|| value_str.to_string());
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    use super::*;

    /// Serves one connection with `status_line`, after reading the request.
    async fn serve_status_line(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !received.ends_with(b"test payload") {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..read]);
            }
            let response =
                format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{address}/ingestion")
    }

    fn request(uri: &str) -> TransportRequest {
        TransportRequest::new(
            uri.parse().unwrap(),
            BTreeMap::from([("X-Original-Header".to_owned(), "test-value".to_owned())]),
            "test payload",
            "application/cloudevents+json",
        )
    }

    #[tokio::test]
    async fn test_post_returns_raw_response() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/ingestion"))
            .and(matchers::header("content-type", "application/cloudevents+json"))
            .and(matchers::header("x-original-header", "test-value"))
            .respond_with(ResponseTemplate::new(403).set_body_raw("No access.", "text/plain"))
            .mount(&mock_server)
            .await;
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();

        let response = transport
            .post(request(&format!("{}/ingestion", mock_server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert_eq!(response.reason, "Forbidden");
        assert_eq!(response.content_type(), "text/plain");
        let body = response.body.read_all().await.unwrap();
        assert_eq!(body, Bytes::from_static(b"No access."));
    }

    #[tokio::test]
    async fn test_per_call_timeout_is_reported_as_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
        let mut request = request(&format!("{}/ingestion", mock_server.uri()));
        request.timeout = Some(Duration::from_millis(100));

        let result = transport.post(request).await;

        assert!(matches!(result, Err(TransportError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_refused_connection_is_reported_as_transport_error() {
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();

        let result = transport.post(request("http://127.0.0.1:1/ingestion")).await;

        let err = result.unwrap_err();
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<reqwest::Error>().is_some());
    }

    #[tokio::test]
    async fn test_custom_reason_phrase_is_kept() {
        let uri = serve_status_line("HTTP/1.1 499 Client Closed Request").await;
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();

        let response = transport.post(request(&uri)).await.unwrap();

        assert_eq!(response.status, 499);
        assert_eq!(response.reason, "Client Closed Request");
    }

    #[tokio::test]
    async fn test_reworded_standard_reason_phrase_is_kept() {
        let uri = serve_status_line("HTTP/1.1 408 Took Too Long").await;
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();

        let response = transport.post(request(&uri)).await.unwrap();

        assert_eq!(response.reason, "Took Too Long");
    }
}
