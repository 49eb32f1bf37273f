//! Transport port: the only place the client performs network I/O.
//!
//! The port takes a fully resolved request and returns the raw response. It
//! knows nothing about CloudEvents; encoding happens before, classification
//! after.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Name of the content type header.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Boxed cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure inside the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within its timeout.
    #[error("request timed out: {message}")]
    Timeout {
        /// Error message from the HTTP client.
        message: String,
        /// Underlying HTTP client error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The connection could not be established (DNS, refused, TLS).
    #[error("connection failed: {message}")]
    Connect {
        /// Error message from the HTTP client.
        message: String,
        /// Underlying HTTP client error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {message}")]
    Body {
        /// Error message from the HTTP client.
        message: String,
        /// Underlying HTTP client error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Any other transport failure.
    #[error("HTTP client error: {message}")]
    Other {
        /// Error message from the HTTP client.
        message: String,
        /// Underlying HTTP client error, if any.
        #[source]
        source: Option<BoxError>,
    },
}

impl TransportError {
    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a connect error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a body read error.
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unclassified transport error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the error that caused this failure.
    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<BoxError>) -> Self {
        let (Self::Timeout { source, .. }
        | Self::Connect { source, .. }
        | Self::Body { source, .. }
        | Self::Other { source, .. }) = &mut self;
        *source = Some(cause.into());
        self
    }
}

/// Per-call options. Anything set here takes precedence over the values the
/// client computes for the request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Timeout for this call only.
    pub timeout: Option<Duration>,
    /// Extra headers, replacing computed headers of the same name.
    pub headers: BTreeMap<String, String>,
    /// Replaces the codec-assigned content type.
    pub content_type: Option<String>,
    /// Replaces the encoded request body.
    pub body: Option<Bytes>,
}

impl RequestOptions {
    /// Options with nothing overridden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Overrides the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Overrides the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A resolved POST request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Target URI.
    pub uri: Url,
    /// Request headers, content type included.
    pub headers: BTreeMap<String, String>,
    /// Request body.
    pub body: Bytes,
    /// Timeout for this request, if overridden.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Creates a request whose `Content-Type` replaces any content type found
    /// in `headers`.
    #[must_use]
    pub fn new(
        uri: Url,
        mut headers: BTreeMap<String, String>,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> Self {
        set_header(&mut headers, CONTENT_TYPE_HEADER, content_type);
        Self {
            uri,
            headers,
            body: body.into(),
            timeout: None,
        }
    }

    /// Applies caller options on top of the computed request.
    #[must_use]
    pub fn with_options(mut self, options: &RequestOptions) -> Self {
        for (name, value) in &options.headers {
            set_header(&mut self.headers, name, value);
        }
        if let Some(content_type) = &options.content_type {
            set_header(&mut self.headers, CONTENT_TYPE_HEADER, content_type);
        }
        if let Some(body) = &options.body {
            self.body = body.clone();
        }
        if options.timeout.is_some() {
            self.timeout = options.timeout;
        }
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Readable body of a response.
#[async_trait]
pub trait ResponseBody: Send + std::fmt::Debug {
    /// Reads the whole body.
    async fn read_all(self: Box<Self>) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl ResponseBody for Bytes {
    async fn read_all(self: Box<Self>) -> Result<Bytes, TransportError> {
        Ok(*self)
    }
}

/// A raw HTTP response.
#[derive(Debug)]
pub struct TransportResponse {
    /// Numeric status code.
    pub status: u16,
    /// Reason phrase of the status, empty if unknown.
    pub reason: String,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Body, not yet read.
    pub body: Box<dyn ResponseBody>,
}

impl TransportResponse {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The response content type, or an empty string when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.header(CONTENT_TYPE_HEADER).unwrap_or_default()
    }
}

/// Capability to issue an HTTP POST.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the response without interpreting its
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if no response was received.
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_owned(), value.to_owned());
}

fn find_header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
