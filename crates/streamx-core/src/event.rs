//! CloudEvent record published to the ingestion endpoint.
//!
//! A `CloudEvent` is immutable once built. Construction goes through
//! `CloudEventBuilder`, which enforces the CloudEvents v1.0 attribute rules the
//! codec relies on.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::CodecError;

/// Context attribute names that extensions may not shadow.
pub(crate) const RESERVED_ATTRIBUTES: [&str; 10] = [
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

/// Event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Structured JSON payload.
    Json(serde_json::Value),
    /// Textual payload.
    String(String),
    /// Opaque bytes, carried as `data_base64` on the wire.
    Binary(Vec<u8>),
    /// Character data that has not been checked for UTF-8 yet, e.g. read from a
    /// file. Encoding fails if the bytes are not valid UTF-8.
    Text(Vec<u8>),
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

/// Value of an extension attribute. Serializes as the bare JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    /// String value.
    String(String),
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
}

impl fmt::Display for ExtensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ExtensionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ExtensionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ExtensionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for ExtensionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A CloudEvents v1.0 record.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEvent {
    id: String,
    source: String,
    ty: String,
    data: Option<Data>,
    data_content_type: Option<String>,
    data_schema: Option<String>,
    subject: Option<String>,
    time: Option<DateTime<Utc>>,
    extensions: BTreeMap<String, ExtensionValue>,
}

impl CloudEvent {
    /// Starts building an event with its three required attributes.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        source: impl Into<String>,
        ty: impl Into<String>,
    ) -> CloudEventBuilder {
        CloudEventBuilder::new(id, source, ty)
    }

    /// Event identifier, unique per source.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Context in which the event happened.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Event type.
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Content type of the payload.
    #[must_use]
    pub fn data_content_type(&self) -> Option<&str> {
        self.data_content_type.as_deref()
    }

    /// Schema the payload adheres to.
    #[must_use]
    pub fn data_schema(&self) -> Option<&str> {
        self.data_schema.as_deref()
    }

    /// Subject of the event within the source.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Time the occurrence happened.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Extension attributes, ordered by name.
    #[must_use]
    pub fn extensions(&self) -> &BTreeMap<String, ExtensionValue> {
        &self.extensions
    }

    /// Looks up a single extension attribute.
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&ExtensionValue> {
        self.extensions.get(name)
    }
}

/// Builder for `CloudEvent`.
#[derive(Debug, Clone)]
pub struct CloudEventBuilder {
    id: String,
    source: String,
    ty: String,
    data: Option<Data>,
    data_content_type: Option<String>,
    data_schema: Option<String>,
    subject: Option<String>,
    time: Option<DateTime<Utc>>,
    extensions: BTreeMap<String, ExtensionValue>,
}

impl CloudEventBuilder {
    /// Creates a builder with the required attributes set.
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            ty: ty.into(),
            data: None,
            data_content_type: None,
            data_schema: None,
            subject: None,
            time: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Sets the payload together with its content type.
    #[must_use]
    pub fn data(mut self, content_type: impl Into<String>, data: impl Into<Data>) -> Self {
        self.data_content_type = Some(content_type.into());
        self.data = Some(data.into());
        self
    }

    /// Sets the payload without declaring a content type.
    #[must_use]
    pub fn data_without_content_type(mut self, data: impl Into<Data>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the payload content type without a payload.
    #[must_use]
    pub fn data_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.data_content_type = Some(content_type.into());
        self
    }

    /// Sets the payload schema reference.
    #[must_use]
    pub fn data_schema(mut self, schema: impl Into<String>) -> Self {
        self.data_schema = Some(schema.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the occurrence time.
    #[must_use]
    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Adds an extension attribute, replacing any previous value.
    #[must_use]
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<ExtensionValue>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    /// Builds the event, stamping it with the system time if no time was set.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::MissingAttribute` if `id`, `source` or `type` is
    /// empty, and `CodecError::InvalidAttribute` for a bad extension name.
    pub fn build(self) -> Result<CloudEvent, CodecError> {
        self.build_with(&SystemClock)
    }

    /// Builds the event, stamping it with `clock` if no time was set.
    ///
    /// # Errors
    ///
    /// Same as [`CloudEventBuilder::build`].
    pub fn build_with(self, clock: &dyn Clock) -> Result<CloudEvent, CodecError> {
        let time = self.time.unwrap_or_else(|| clock.now());
        let mut event = self.build_untimed()?;
        event.time = Some(time);
        Ok(event)
    }

    /// Builds the event without filling in a missing time. Used by the decoder,
    /// where the wire representation is authoritative.
    pub(crate) fn build_untimed(self) -> Result<CloudEvent, CodecError> {
        require_non_empty("id", &self.id)?;
        require_non_empty("source", &self.source)?;
        require_non_empty("type", &self.ty)?;
        for name in self.extensions.keys() {
            validate_extension_name(name)?;
        }

        Ok(CloudEvent {
            id: self.id,
            source: self.source,
            ty: self.ty,
            data: self.data,
            data_content_type: self.data_content_type,
            data_schema: self.data_schema,
            subject: self.subject,
            time: self.time,
            extensions: self.extensions,
        })
    }
}

fn require_non_empty(name: &'static str, value: &str) -> Result<(), CodecError> {
    if value.is_empty() {
        return Err(CodecError::MissingAttribute(name));
    }
    Ok(())
}

pub(crate) fn validate_extension_name(name: &str) -> Result<(), CodecError> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(CodecError::invalid(
            name,
            "extension names must be lowercase ASCII letters or digits",
        ));
    }
    if RESERVED_ATTRIBUTES.contains(&name) {
        return Err(CodecError::invalid(
            name,
            "extension name collides with a context attribute",
        ));
    }
    Ok(())
}
