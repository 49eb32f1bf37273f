//! Structural event comparison for assertions.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use streamx_core::{CloudEvent, Data};

/// Asserts that two events carry the same attributes. Times are compared at
/// second granularity, payloads through their JSON form.
///
/// # Panics
///
/// Panics naming the first attribute that differs.
pub fn assert_same_events(actual: &CloudEvent, expected: &CloudEvent) {
    assert_eq!(actual.id(), expected.id(), "id");
    assert_eq!(actual.source(), expected.source(), "source");
    assert_eq!(actual.ty(), expected.ty(), "type");
    assert_eq!(
        actual.data().map(canonical_data),
        expected.data().map(canonical_data),
        "data"
    );
    assert_eq!(
        actual.data_content_type(),
        expected.data_content_type(),
        "datacontenttype"
    );
    assert_eq!(actual.data_schema(), expected.data_schema(), "dataschema");
    assert_eq!(actual.subject(), expected.subject(), "subject");
    assert_eq!(
        actual.time().map(|time| time.timestamp()),
        expected.time().map(|time| time.timestamp()),
        "time"
    );
    assert_eq!(actual.extensions(), expected.extensions(), "extensions");
}

/// Asserts that two event lists have the same length and pairwise equal
/// events.
///
/// # Panics
///
/// Panics if the lengths or any pair of events differ.
pub fn assert_same_event_lists(actual: &[CloudEvent], expected: &[CloudEvent]) {
    assert_eq!(actual.len(), expected.len(), "number of events");
    for (actual, expected) in actual.iter().zip(expected) {
        assert_same_events(actual, expected);
    }
}

fn canonical_data(data: &Data) -> String {
    let value = match data {
        Data::Json(value) => value.clone(),
        Data::String(text) => Value::String(text.clone()),
        Data::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
        Data::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    };
    value.to_string()
}
