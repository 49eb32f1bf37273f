//! Test transports: scripted `HttpTransport` implementations for tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use streamx_core::{CloudEvent, JsonEventCodec};
use streamx_ingestion::{
    HttpTransport, ResponseBody, TransportError, TransportRequest, TransportResponse,
};

/// A canned response for `RecordingTransport`.
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    reason: String,
    content_type: Option<String>,
    body: Option<Bytes>,
}

impl StubResponse {
    /// A response with an empty body and no content type.
    #[must_use]
    pub fn new(status: u16, reason: &str) -> Self {
        Self {
            status,
            reason: reason.to_owned(),
            content_type: None,
            body: Some(Bytes::new()),
        }
    }

    /// A 202 response carrying `events` in the codec's envelope.
    #[must_use]
    pub fn accepted(events: &[CloudEvent]) -> Self {
        Self::with_events(202, "Accepted", events)
    }

    /// A response carrying `events` in the codec's envelope.
    ///
    /// # Panics
    ///
    /// Panics if `events` is empty or cannot be encoded.
    #[must_use]
    pub fn with_events(status: u16, reason: &str, events: &[CloudEvent]) -> Self {
        let serialized = JsonEventCodec::new()
            .encode(events)
            .expect("stub events encode");
        Self::new(status, reason).with_body(serialized.content_type(), serialized.into_body())
    }

    /// A plain text response.
    #[must_use]
    pub fn text(status: u16, reason: &str, text: &str) -> Self {
        Self::new(status, reason).with_body("text/plain", text.to_owned())
    }

    /// Replaces the body and its content type.
    #[must_use]
    pub fn with_body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.content_type = Some(content_type.to_owned());
        self.body = Some(body.into());
        self
    }

    /// Makes reading the body fail.
    #[must_use]
    pub fn with_unreadable_body(mut self) -> Self {
        self.body = None;
        self
    }

    fn into_response(self) -> TransportResponse {
        let headers = self
            .content_type
            .map(|content_type| BTreeMap::from([("Content-Type".to_owned(), content_type)]))
            .unwrap_or_default();
        let body: Box<dyn ResponseBody> = match self.body {
            Some(body) => Box::new(body),
            None => Box::new(UnreadableBody),
        };
        TransportResponse {
            status: self.status,
            reason: self.reason,
            headers,
            body,
        }
    }
}

#[derive(Debug)]
struct UnreadableBody;

#[async_trait]
impl ResponseBody for UnreadableBody {
    async fn read_all(self: Box<Self>) -> Result<Bytes, TransportError> {
        Err(TransportError::body("connection reset while reading body"))
    }
}

/// A transport that records every request and answers with the scripted
/// responses in order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<StubResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl RecordingTransport {
    /// Create a transport answering with `responses`, one per request.
    #[must_use]
    pub fn new(responses: Vec<StubResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a transport answering the first request with `response`.
    #[must_use]
    pub fn responding(response: StubResponse) -> Self {
        Self::new(vec![response])
    }

    /// Returns a snapshot of all requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .map(StubResponse::into_response)
            .ok_or_else(|| TransportError::other("no scripted response left"))
    }
}

/// A transport that never reaches the server. Useful for testing
/// communication error paths.
#[derive(Debug)]
pub struct FailingTransport;

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn post(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
        Err(TransportError::connect("connection refused"))
    }
}
