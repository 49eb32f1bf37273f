//! Event codec: one or many events to a request payload and back.
//!
//! A single event travels in the structured envelope, two or more in the batch
//! envelope. The content type is the only signal the receiving side has for
//! picking a decoder, so `encode` always returns the two together.

use serde_json::Value;

use crate::error::CodecError;
use crate::event::CloudEvent;
use crate::format::{self, media_type_essence};

/// Content type of a single event in structured mode.
pub const CLOUD_EVENT_CONTENT_TYPE: &str = "application/cloudevents+json";

/// Content type of a batch of events.
pub const BATCH_CLOUD_EVENT_CONTENT_TYPE: &str = "application/cloudevents-batch+json";

/// Encoded payload and the content type it must be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedEvents {
    body: String,
    content_type: &'static str,
}

impl SerializedEvents {
    /// The JSON text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Either [`CLOUD_EVENT_CONTENT_TYPE`] or [`BATCH_CLOUD_EVENT_CONTENT_TYPE`].
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Consumes the payload, returning the JSON text.
    #[must_use]
    pub fn into_body(self) -> String {
        self.body
    }
}

/// Stateless JSON codec for CloudEvents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEventCodec;

impl JsonEventCodec {
    /// Creates a codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encodes `events`, choosing the envelope by count.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::EmptyBatch` for an empty slice,
    /// `CodecError::MalformedUtf8` when a text payload is not UTF-8, and
    /// `CodecError::Json` if JSON output fails.
    pub fn encode(&self, events: &[CloudEvent]) -> Result<SerializedEvents, CodecError> {
        match events {
            [] => Err(CodecError::EmptyBatch),
            [event] => Ok(SerializedEvents {
                body: serde_json::to_string(&format::to_value(event)?)?,
                content_type: CLOUD_EVENT_CONTENT_TYPE,
            }),
            _ => {
                let values = events
                    .iter()
                    .map(format::to_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SerializedEvents {
                    body: serde_json::to_string(&values)?,
                    content_type: BATCH_CLOUD_EVENT_CONTENT_TYPE,
                })
            }
        }
    }

    /// Decodes `body` according to `content_type`.
    ///
    /// Content types other than the two CloudEvents types yield an empty list;
    /// callers decide whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::MalformedUtf8` if the body is not UTF-8,
    /// `CodecError::Json` if it is not JSON, and the attribute errors of the
    /// structured format for malformed events.
    pub fn decode(&self, body: &[u8], content_type: &str) -> Result<Vec<CloudEvent>, CodecError> {
        let essence = media_type_essence(content_type);
        if essence != CLOUD_EVENT_CONTENT_TYPE && essence != BATCH_CLOUD_EVENT_CONTENT_TYPE {
            return Ok(Vec::new());
        }

        let text = std::str::from_utf8(body).map_err(|_| CodecError::MalformedUtf8)?;
        let value: Value = serde_json::from_str(text)?;

        if essence == CLOUD_EVENT_CONTENT_TYPE {
            return Ok(vec![format::from_value(value)?]);
        }
        match value {
            Value::Array(items) => items.into_iter().map(format::from_value).collect(),
            _ => Err(CodecError::InvalidEnvelope("a JSON array")),
        }
    }
}
