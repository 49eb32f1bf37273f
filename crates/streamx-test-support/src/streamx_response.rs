//! Canned ingestion endpoint responses for `wiremock` mock servers.

use streamx_core::{CloudEvent, JsonEventCodec};
use wiremock::ResponseTemplate;

/// A 202 response echoing `event` in the single event envelope.
#[must_use]
pub fn success(event: &CloudEvent) -> ResponseTemplate {
    successes(std::slice::from_ref(event))
}

/// A 202 response carrying `events`.
#[must_use]
pub fn successes(events: &[CloudEvent]) -> ResponseTemplate {
    with_events(202, events)
}

/// A response with status `status` carrying `events` in the envelope the
/// client would use to send them.
///
/// # Panics
///
/// Panics if `events` is empty or cannot be encoded.
#[must_use]
pub fn with_events(status: u16, events: &[CloudEvent]) -> ResponseTemplate {
    let serialized = JsonEventCodec::new()
        .encode(events)
        .expect("response events encode");
    let content_type = serialized.content_type();
    ResponseTemplate::new(status).set_body_raw(serialized.into_body(), content_type)
}

/// A plain text error response.
#[must_use]
pub fn failure(status: u16, text: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(text.to_owned(), "text/plain")
}
