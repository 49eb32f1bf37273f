//! JSON structured representation of a single CloudEvent.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::event::{CloudEvent, CloudEventBuilder, Data, ExtensionValue, validate_extension_name};

const SPEC_VERSION: &str = "1.0";

/// Converts an event into its structured JSON object.
pub(crate) fn to_value(event: &CloudEvent) -> Result<Value, CodecError> {
    let mut map = Map::new();
    map.insert("specversion".into(), SPEC_VERSION.into());
    map.insert("id".into(), event.id().into());
    map.insert("source".into(), event.source().into());
    map.insert("type".into(), event.ty().into());
    if let Some(content_type) = event.data_content_type() {
        map.insert("datacontenttype".into(), content_type.into());
    }
    if let Some(schema) = event.data_schema() {
        map.insert("dataschema".into(), schema.into());
    }
    if let Some(subject) = event.subject() {
        map.insert("subject".into(), subject.into());
    }
    if let Some(time) = event.time() {
        map.insert(
            "time".into(),
            time.to_rfc3339_opts(SecondsFormat::AutoSi, true).into(),
        );
    }
    for (name, value) in event.extensions() {
        map.insert(name.clone(), serde_json::to_value(value)?);
    }
    match event.data() {
        None => {}
        Some(Data::Json(value)) => {
            map.insert("data".into(), value.clone());
        }
        Some(Data::String(text)) => {
            map.insert("data".into(), text.as_str().into());
        }
        Some(Data::Binary(bytes)) => {
            map.insert("data_base64".into(), STANDARD.encode(bytes).into());
        }
        Some(Data::Text(bytes)) => {
            let text = std::str::from_utf8(bytes).map_err(|_| CodecError::MalformedUtf8)?;
            map.insert("data".into(), text.into());
        }
    }
    Ok(Value::Object(map))
}

/// Reconstructs an event from its structured JSON object.
pub(crate) fn from_value(value: Value) -> Result<CloudEvent, CodecError> {
    let Value::Object(mut map) = value else {
        return Err(CodecError::InvalidEnvelope("a JSON object"));
    };

    match map.remove("specversion") {
        Some(Value::String(version)) if version == SPEC_VERSION => {}
        _ => return Err(CodecError::UnsupportedSpecVersion),
    }

    let id = required_string(&mut map, "id")?;
    let source = required_string(&mut map, "source")?;
    let ty = required_string(&mut map, "type")?;
    let mut builder = CloudEventBuilder::new(id, source, ty);

    let content_type = optional_string(&mut map, "datacontenttype")?;
    if let Some(schema) = optional_string(&mut map, "dataschema")? {
        builder = builder.data_schema(schema);
    }
    if let Some(subject) = optional_string(&mut map, "subject")? {
        builder = builder.subject(subject);
    }
    if let Some(time) = optional_string(&mut map, "time")? {
        let parsed = DateTime::parse_from_rfc3339(&time)
            .map_err(|e| CodecError::invalid("time", e.to_string()))?;
        builder = builder.time(parsed.with_timezone(&Utc));
    }

    let data = match (map.remove("data"), map.remove("data_base64")) {
        (Some(_), Some(_)) => {
            return Err(CodecError::invalid(
                "data",
                "data and data_base64 are mutually exclusive",
            ));
        }
        (Some(value), None) => Some(json_data(value, content_type.as_deref())),
        (None, Some(Value::String(encoded))) => Some(Data::Binary(STANDARD.decode(encoded)?)),
        (None, Some(_)) => return Err(CodecError::invalid("data_base64", "expected a string")),
        (None, None) => None,
    };
    if let Some(data) = data {
        builder = builder.data_without_content_type(data);
    }
    if let Some(content_type) = content_type {
        builder = builder.data_content_type(content_type);
    }

    for (name, value) in map {
        validate_extension_name(&name)?;
        let value = match value {
            Value::String(s) => ExtensionValue::String(s),
            Value::Bool(b) => ExtensionValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ExtensionValue::Integer(i),
                None => return Err(CodecError::invalid(name, "expected an integer")),
            },
            _ => {
                return Err(CodecError::invalid(
                    name,
                    "expected a string, boolean or integer",
                ));
            }
        };
        builder = builder.extension(name, value);
    }

    builder.build_untimed()
}

fn json_data(value: Value, content_type: Option<&str>) -> Data {
    if is_json_content_type(content_type) {
        return Data::Json(value);
    }
    match value {
        Value::String(text) => Data::String(text),
        other => Data::Json(other),
    }
}

/// `true` when a payload of this content type is carried as a JSON value.
pub(crate) fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let essence = media_type_essence(content_type);
    essence == "application/json" || essence == "text/json" || essence.ends_with("+json")
}

/// Lowercased media type without parameters.
pub(crate) fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn required_string(map: &mut Map<String, Value>, name: &'static str) -> Result<String, CodecError> {
    optional_string(map, name)?.ok_or(CodecError::MissingAttribute(name))
}

fn optional_string(
    map: &mut Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, CodecError> {
    match map.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(CodecError::invalid(name, "expected a string")),
    }
}
