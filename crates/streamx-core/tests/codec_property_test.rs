//! Property-based tests for the event codec.
//!
//! Covers the round-trip law under structural equality and envelope selection
//! over generated events.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Map, Value};
use streamx_core::{
    BATCH_CLOUD_EVENT_CONTENT_TYPE, CLOUD_EVENT_CONTENT_TYPE, CloudEvent, Data, ExtensionValue,
    JsonEventCodec,
};
use streamx_test_support::assert_same_event_lists;

const RESERVED: [&str; 10] = [
    "specversion",
    "id",
    "source",
    "type",
    "datacontenttype",
    "dataschema",
    "subject",
    "time",
    "data",
    "data_base64",
];

/// Arbitrary JSON, floats included.
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(Value::from),
        "\\PC{0,20}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z0-9_]{0,8}", inner, 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Payloads with the content type they are sent under. `None` as content type
/// means the attribute is left out.
fn data_strategy() -> impl Strategy<Value = Option<(Option<&'static str>, Data)>> {
    prop_oneof![
        Just(None),
        json_strategy().prop_map(|value| Some((Some("application/json"), Data::Json(value)))),
        json_strategy().prop_map(|value| Some((Some("application/vnd.page+json"), Data::Json(value)))),
        json_strategy().prop_map(|value| Some((None, Data::Json(value)))),
        "\\PC{0,40}".prop_map(|text| Some((Some("text/plain"), Data::String(text)))),
        "\\PC{0,40}".prop_map(|text| Some((Some("application/json"), Data::String(text)))),
        "\\PC{0,40}".prop_map(|text| Some((Some("text/html"), Data::Text(text.into_bytes())))),
        prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(|bytes| Some((Some("application/octet-stream"), Data::Binary(bytes)))),
    ]
}

fn extension_value_strategy() -> impl Strategy<Value = ExtensionValue> {
    prop_oneof![
        "[a-z0-9-]{0,12}".prop_map(ExtensionValue::String),
        any::<bool>().prop_map(ExtensionValue::Boolean),
        any::<i64>().prop_map(ExtensionValue::Integer),
    ]
}

/// Drops the `time` attribute by passing the event through its JSON form.
fn without_time(event: &CloudEvent) -> CloudEvent {
    let codec = JsonEventCodec::new();
    let body = codec.encode(std::slice::from_ref(event)).unwrap().into_body();
    let mut value: Value = serde_json::from_str(&body).unwrap();
    value.as_object_mut().unwrap().remove("time");
    codec
        .decode(value.to_string().as_bytes(), CLOUD_EVENT_CONTENT_TYPE)
        .unwrap()
        .remove(0)
}

/// Strategy for valid events, with or without a time.
fn event_strategy() -> impl Strategy<Value = CloudEvent> {
    (
        "[a-zA-Z0-9-]{1,36}",
        "[a-z/:.]{1,30}",
        "[a-z.]{1,40}",
        data_strategy(),
        proptest::option::of("[a-z0-9-]{1,20}"),
        proptest::option::of("https://schemas\\.example\\.com/[a-z]{1,10}"),
        proptest::option::of((0i64..4_102_444_800, 0u32..1_000_000_000)),
        prop::collection::btree_map(
            "[a-z][a-z0-9]{0,9}".prop_filter("reserved", |name| !RESERVED.contains(&name.as_str())),
            extension_value_strategy(),
            0..4,
        ),
    )
        .prop_map(|(id, source, ty, data, subject, schema, time, extensions)| {
            let mut builder = CloudEvent::builder(id, source, ty);
            match data {
                Some((Some(content_type), data)) => builder = builder.data(content_type, data),
                Some((None, data)) => builder = builder.data_without_content_type(data),
                None => {}
            }
            if let Some(subject) = subject {
                builder = builder.subject(subject);
            }
            if let Some(schema) = schema {
                builder = builder.data_schema(schema);
            }
            if let Some((secs, nanos)) = time {
                builder = builder.time(Utc.timestamp_opt(secs, nanos).unwrap());
            }
            for (name, value) in extensions {
                builder = builder.extension(name, value);
            }
            let event = builder.build().unwrap();
            if time.is_some() { event } else { without_time(&event) }
        })
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(events in prop::collection::vec(event_strategy(), 1..8)) {
        let codec = JsonEventCodec::new();

        let serialized = codec.encode(&events).unwrap();
        let decoded = codec
            .decode(serialized.body().as_bytes(), serialized.content_type())
            .unwrap();

        assert_same_event_lists(&decoded, &events);
    }

    #[test]
    fn prop_json_payloads_decode_identically(value in json_strategy()) {
        let codec = JsonEventCodec::new();
        let event = CloudEvent::builder("id", "source", "generic.event")
            .data("application/json", value.clone())
            .build()
            .unwrap();

        let serialized = codec.encode(std::slice::from_ref(&event)).unwrap();
        let decoded = codec
            .decode(serialized.body().as_bytes(), serialized.content_type())
            .unwrap();

        prop_assert_eq!(decoded[0].data(), Some(&Data::Json(value)));
    }

    #[test]
    fn prop_envelope_follows_event_count(events in prop::collection::vec(event_strategy(), 1..8)) {
        let serialized = JsonEventCodec::new().encode(&events).unwrap();

        let expected = if events.len() == 1 {
            CLOUD_EVENT_CONTENT_TYPE
        } else {
            BATCH_CLOUD_EVENT_CONTENT_TYPE
        };
        prop_assert_eq!(serialized.content_type(), expected);
    }
}
