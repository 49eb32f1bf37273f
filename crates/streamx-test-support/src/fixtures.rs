//! Event fixtures shaped like the events StreamX blueprints publish.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use streamx_core::CloudEvent;

use crate::clock::FixedClock;

/// Type of a generic test event.
pub const GENERIC_EVENT_TYPE: &str = "generic.event";
/// Type of a page publication event.
pub const PAGE_PUBLISHED_TYPE: &str = "com.streamx.blueprints.page.published.v1";
/// Type of a page removal event.
pub const PAGE_UNPUBLISHED_TYPE: &str = "com.streamx.blueprints.page.unpublished.v1";
/// Default event time, in seconds since the Unix epoch.
pub const FIXTURE_TIME_SECS: i64 = 1_700_000_000;

/// A generic event with id `id`, source `source` and JSON `content`.
#[must_use]
pub fn event(subject: &str, content: Option<Value>) -> CloudEvent {
    event_of_type(subject, content, GENERIC_EVENT_TYPE, FIXTURE_TIME_SECS)
}

/// An event of type `ty` with JSON `content`, occurring at `time_secs`.
///
/// # Panics
///
/// Panics if the attributes do not form a valid event.
#[must_use]
pub fn event_of_type(
    subject: &str,
    content: Option<Value>,
    ty: &str,
    time_secs: i64,
) -> CloudEvent {
    let builder = CloudEvent::builder("id", "source", ty).subject(subject);
    let builder = match content {
        Some(content) => builder.data("application/json", content),
        None => builder.data_content_type("application/json"),
    };
    builder
        .build_with(&FixedClock::at_timestamp(time_secs))
        .expect("fixture event is valid")
}

/// A page publication event whose payload is `{"content": <base64 of content>}`.
#[must_use]
pub fn page_publish_event(subject: &str, content: &str) -> CloudEvent {
    let page = json!({ "content": STANDARD.encode(content) });
    event_of_type(subject, Some(page), PAGE_PUBLISHED_TYPE, FIXTURE_TIME_SECS)
}

/// A page removal event without payload.
#[must_use]
pub fn page_unpublish_event(subject: &str) -> CloudEvent {
    event_of_type(subject, None, PAGE_UNPUBLISHED_TYPE, FIXTURE_TIME_SECS)
}
