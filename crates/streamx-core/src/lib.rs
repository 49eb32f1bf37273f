//! StreamX Core — CloudEvent model and wire codec.
//!
//! This crate defines the event record published to the ingestion endpoint and
//! the JSON codec that turns one or many events into a request payload. It
//! contains no network code.

pub mod clock;
pub mod codec;
pub mod error;
pub mod event;
mod format;

pub use codec::{
    BATCH_CLOUD_EVENT_CONTENT_TYPE, CLOUD_EVENT_CONTENT_TYPE, JsonEventCodec, SerializedEvents,
};
pub use error::CodecError;
pub use event::{CloudEvent, CloudEventBuilder, Data, ExtensionValue};
