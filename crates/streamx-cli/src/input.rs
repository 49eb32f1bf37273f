//! Reading events from and writing events to the command line.

use std::error::Error;

use streamx_core::{
    BATCH_CLOUD_EVENT_CONTENT_TYPE, CLOUD_EVENT_CONTENT_TYPE, CloudEvent, JsonEventCodec,
};

/// Decodes a single structured CloudEvent or a JSON array of them.
pub(crate) fn parse_events(input: &[u8]) -> Result<Vec<CloudEvent>, Box<dyn Error>> {
    let first = input.iter().find(|byte| !byte.is_ascii_whitespace());
    let content_type = match first {
        Some(b'[') => BATCH_CLOUD_EVENT_CONTENT_TYPE,
        Some(_) => CLOUD_EVENT_CONTENT_TYPE,
        None => return Err("no input: expected a CloudEvent or an array of CloudEvents".into()),
    };

    let events = JsonEventCodec::new().decode(input, content_type)?;
    if events.is_empty() {
        return Err("no events to publish".into());
    }
    Ok(events)
}

/// Renders events as pretty JSON in the envelope matching their count.
pub(crate) fn render_events(events: &[CloudEvent]) -> Result<String, Box<dyn Error>> {
    let serialized = JsonEventCodec::new().encode(events)?;
    let value: serde_json::Value = serde_json::from_str(serialized.body())?;
    Ok(serde_json::to_string_pretty(&value)?)
}
