//! Codec error types.

use thiserror::Error;

/// Failure to build, encode or decode a CloudEvent.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Character data is not valid UTF-8.
    #[error("Malformed UTF-8 characters, possibly incorrectly encoded")]
    MalformedUtf8,

    /// Encoding was requested for an empty event list.
    #[error("at least one event is required")]
    EmptyBatch,

    /// The payload is not well-formed JSON, or JSON output failed.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The envelope declares a `specversion` other than `1.0`.
    #[error("Unsupported CloudEvent spec version.")]
    UnsupportedSpecVersion,

    /// A required context attribute is absent or empty.
    #[error("missing required attribute: {0}")]
    MissingAttribute(&'static str),

    /// An attribute is present but has an unusable value.
    #[error("invalid attribute {name}: {reason}")]
    InvalidAttribute {
        /// The attribute name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The JSON document has the wrong shape for its envelope.
    #[error("expected {0}")]
    InvalidEnvelope(&'static str),

    /// `data_base64` does not hold valid base64.
    #[error("invalid data_base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl CodecError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
