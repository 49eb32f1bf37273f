//! Client error types.
//!
//! Every failure the client can report is a `ClientError`. The display text of
//! each variant is the message callers see; `kind()` gives the coarse category.

use streamx_core::{CloudEvent, CodecError};
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Coarse category of a `ClientError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Events could not be encoded, or a response body could not be decoded.
    Serialization,
    /// The HTTP call failed, or the endpoint answered with an unmapped status.
    Communication,
    /// HTTP 400.
    BadRequest,
    /// HTTP 401.
    AuthenticationFailed,
    /// HTTP 403.
    Forbidden,
    /// HTTP 500.
    ServerError,
    /// HTTP 503.
    ServiceUnavailable,
    /// HTTP 202 without any decodable result event.
    Protocol,
    /// The response body could not be read.
    BodyRead,
    /// The client could not be configured.
    Configuration,
}

/// Failure of a client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request events could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[source] CodecError),

    /// The response body could not be decoded into events.
    #[error("Error while parsing body of response with HTTP status {status}. {source}")]
    ResponseParse {
        /// HTTP status of the response.
        status: u16,
        /// Decoder failure.
        source: CodecError,
    },

    /// The HTTP call itself failed (DNS, connect, TLS, timeout).
    #[error("Ingestion POST request with URI: {uri} failed due to HTTP client error")]
    Transport {
        /// Target URI of the request.
        uri: String,
        /// Transport failure.
        source: TransportError,
    },

    /// The endpoint answered but its body could not be read.
    #[error("Response could not be read. Response status: {status}")]
    BodyRead {
        /// HTTP status of the response.
        status: u16,
        /// Transport failure while reading.
        source: TransportError,
    },

    /// HTTP 202 whose body holds no events.
    #[error("Success response contains no response events")]
    EmptySuccess,

    /// HTTP 400.
    #[error("Bad request. {message}")]
    BadRequest {
        /// Plain-text response body, or empty.
        message: String,
    },

    /// HTTP 401.
    #[error("Authentication failed. Make sure that the given token is valid.")]
    AuthenticationFailed,

    /// HTTP 403.
    #[error("Forbidden. {message}")]
    Forbidden {
        /// Plain-text response body, or empty.
        message: String,
    },

    /// HTTP 500, possibly with per-event diagnostics.
    #[error("Unexpected server error. {message}")]
    ServerError {
        /// Plain-text response body, or empty.
        message: String,
        /// Events the server returned alongside the failure.
        response_events: Vec<CloudEvent>,
    },

    /// HTTP 503.
    #[error("Service unavailable. {message}")]
    ServiceUnavailable {
        /// Plain-text response body, or empty.
        message: String,
    },

    /// Any status without a dedicated mapping.
    #[error("Communication error. Response status: {status}. Message: {reason}")]
    UnexpectedStatus {
        /// HTTP status of the response.
        status: u16,
        /// Reason phrase of the status.
        reason: String,
    },

    /// The ingestion endpoint URI is relative or cannot be parsed.
    #[error("Ingestion endpoint URI: {uri} is malformed. {reason}")]
    InvalidEndpoint {
        /// The concatenated URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Any other configuration problem.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Serialization(_) | Self::ResponseParse { .. } => ErrorKind::Serialization,
            Self::Transport { .. } | Self::UnexpectedStatus { .. } => ErrorKind::Communication,
            Self::BodyRead { .. } => ErrorKind::BodyRead,
            Self::EmptySuccess => ErrorKind::Protocol,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::InvalidEndpoint { .. } | Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Events the server attached to a failed response. Empty unless the
    /// endpoint answered 500 with a CloudEvents body.
    #[must_use]
    pub fn response_events(&self) -> &[CloudEvent] {
        match self {
            Self::ServerError {
                response_events, ..
            } => response_events,
            _ => &[],
        }
    }
}
