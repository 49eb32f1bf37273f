//! Response interpreter: turns a raw ingestion response into result events or
//! a `ClientError`.
//!
//! Classification is keyed on the status code alone. Only 202 and 500 bodies
//! are decoded as events; for the other mapped statuses a plain-text body is
//! copied into the error message.

use streamx_core::{CloudEvent, JsonEventCodec};

use crate::error::{ClientError, Result};
use crate::transport::TransportResponse;

/// How the endpoint answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 202: every event was accepted.
    Accepted,
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 500.
    ServerError,
    /// 503.
    ServiceUnavailable,
    /// Anything else.
    Unexpected,
}

const STATUS_TABLE: [(u16, ResponseClass); 6] = [
    (202, ResponseClass::Accepted),
    (400, ResponseClass::BadRequest),
    (401, ResponseClass::Unauthorized),
    (403, ResponseClass::Forbidden),
    (500, ResponseClass::ServerError),
    (503, ResponseClass::ServiceUnavailable),
];

/// Maps a status code to its response class.
#[must_use]
pub fn classify_status(status: u16) -> ResponseClass {
    STATUS_TABLE
        .iter()
        .find(|(code, _)| *code == status)
        .map_or(ResponseClass::Unexpected, |(_, class)| *class)
}

/// Interprets ingestion responses, decoding event bodies with its codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter {
    codec: JsonEventCodec,
}

impl ResponseInterpreter {
    /// Creates an interpreter using `codec` for event bodies.
    #[must_use]
    pub fn new(codec: JsonEventCodec) -> Self {
        Self { codec }
    }

    /// Reads the body of `response` and interprets it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::BodyRead` if the body cannot be read, and
    /// otherwise whatever [`ResponseInterpreter::interpret_body`] returns.
    pub async fn interpret(&self, response: TransportResponse) -> Result<Vec<CloudEvent>> {
        let status = response.status;
        let content_type = response.content_type().to_owned();
        let reason = response.reason;
        let body = response
            .body
            .read_all()
            .await
            .map_err(|source| ClientError::BodyRead { status, source })?;

        self.interpret_body(status, &reason, &content_type, &body)
    }

    /// Interprets an already-read response.
    ///
    /// # Errors
    ///
    /// Returns the `ClientError` variant mapped to `status`, or
    /// `ClientError::ResponseParse` if a 202 or 500 body holds malformed
    /// events.
    pub fn interpret_body(
        &self,
        status: u16,
        reason: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<Vec<CloudEvent>> {
        match classify_status(status) {
            ResponseClass::Accepted => {
                let events = self.decode_events(status, content_type, body)?;
                if events.is_empty() {
                    return Err(ClientError::EmptySuccess);
                }
                Ok(events)
            }
            ResponseClass::BadRequest => Err(ClientError::BadRequest {
                message: plain_text(content_type, body),
            }),
            ResponseClass::Unauthorized => Err(ClientError::AuthenticationFailed),
            ResponseClass::Forbidden => Err(ClientError::Forbidden {
                message: plain_text(content_type, body),
            }),
            ResponseClass::ServerError => Err(ClientError::ServerError {
                response_events: self.decode_events(status, content_type, body)?,
                message: plain_text(content_type, body),
            }),
            ResponseClass::ServiceUnavailable => Err(ClientError::ServiceUnavailable {
                message: plain_text(content_type, body),
            }),
            ResponseClass::Unexpected => Err(ClientError::UnexpectedStatus {
                status,
                reason: reason.to_owned(),
            }),
        }
    }

    fn decode_events(&self, status: u16, content_type: &str, body: &[u8]) -> Result<Vec<CloudEvent>> {
        self.codec
            .decode(body, content_type)
            .map_err(|source| ClientError::ResponseParse { status, source })
    }
}

/// The body as text when the response is `text/plain`, otherwise empty.
fn plain_text(content_type: &str, body: &[u8]) -> String {
    let is_plain = content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("text/plain"));
    if is_plain {
        String::from_utf8_lossy(body).into_owned()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use streamx_core::{BATCH_CLOUD_EVENT_CONTENT_TYPE, CLOUD_EVENT_CONTENT_TYPE};

    use super::*;
    use crate::error::ErrorKind;

    fn event(subject: &str) -> CloudEvent {
        CloudEvent::builder("id", "source", "generic.event")
            .subject(subject)
            .time(chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .build()
            .unwrap()
    }

    fn interpret(status: u16, content_type: &str, body: &[u8]) -> Result<Vec<CloudEvent>> {
        ResponseInterpreter::default().interpret_body(status, "Reason", content_type, body)
    }

    #[test]
    fn test_status_table_is_total() {
        assert_eq!(classify_status(202), ResponseClass::Accepted);
        assert_eq!(classify_status(400), ResponseClass::BadRequest);
        assert_eq!(classify_status(401), ResponseClass::Unauthorized);
        assert_eq!(classify_status(403), ResponseClass::Forbidden);
        assert_eq!(classify_status(500), ResponseClass::ServerError);
        assert_eq!(classify_status(503), ResponseClass::ServiceUnavailable);
        for status in [100, 200, 201, 204, 301, 404, 408, 429, 502, 504] {
            assert_eq!(classify_status(status), ResponseClass::Unexpected);
        }
    }

    #[test]
    fn test_accepted_returns_decoded_events() {
        let events = vec![event("a"), event("b")];
        let serialized = JsonEventCodec::new().encode(&events).unwrap();

        let result = interpret(202, BATCH_CLOUD_EVENT_CONTENT_TYPE, serialized.body().as_bytes());

        assert_eq!(result.unwrap(), events);
    }

    #[test]
    fn test_accepted_without_events_is_protocol_error() {
        let err = interpret(202, "text/plain", b"failure").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.to_string(), "Success response contains no response events");
    }

    #[test]
    fn test_accepted_with_empty_batch_is_protocol_error() {
        let err = interpret(202, BATCH_CLOUD_EVENT_CONTENT_TYPE, b"[]").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_accepted_with_malformed_event_is_parse_error() {
        let err = interpret(
            202,
            CLOUD_EVENT_CONTENT_TYPE,
            br#"{ "this-is-not" : "a-valid-cloud-event" }"#,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert_eq!(
            err.to_string(),
            "Error while parsing body of response with HTTP status 202. Unsupported CloudEvent spec version."
        );
    }

    #[test]
    fn test_plain_text_body_is_copied_into_message() {
        let err = interpret(400, "text/plain; charset=utf-8", b"Invalid data.").unwrap_err();
        assert_eq!(err.to_string(), "Bad request. Invalid data.");

        let err = interpret(403, "text/plain", b"No access.").unwrap_err();
        assert_eq!(err.to_string(), "Forbidden. No access.");

        let err = interpret(503, "text/plain", b"Too many requests.").unwrap_err();
        assert_eq!(err.to_string(), "Service unavailable. Too many requests.");
    }

    #[test]
    fn test_non_text_body_is_left_out_of_message() {
        let err = interpret(400, "application/json", br#"{"error":"x"}"#).unwrap_err();

        assert_eq!(err.to_string(), "Bad request. ");
    }

    #[test]
    fn test_unauthorized_ignores_body() {
        let err = interpret(401, "text/plain", b"You are unauthorized.").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        assert_eq!(
            err.to_string(),
            "Authentication failed. Make sure that the given token is valid."
        );
    }

    #[test]
    fn test_server_error_attaches_response_events() {
        let response_event = event("key");
        let serialized = JsonEventCodec::new()
            .encode(std::slice::from_ref(&response_event))
            .unwrap();

        let err = interpret(500, CLOUD_EVENT_CONTENT_TYPE, serialized.body().as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.to_string(), "Unexpected server error. ");
        assert_eq!(err.response_events(), &[response_event]);
    }

    #[test]
    fn test_server_error_with_plain_body_has_no_events() {
        let err = interpret(500, "text/plain", b"Out of memory.").unwrap_err();

        assert_eq!(err.to_string(), "Unexpected server error. Out of memory.");
        assert!(err.response_events().is_empty());
    }

    #[test]
    fn test_unmapped_status_reports_reason_phrase() {
        let err = ResponseInterpreter::default()
            .interpret_body(408, "Request Timeout", "text/plain", b"timed out")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Communication);
        assert_eq!(
            err.to_string(),
            "Communication error. Response status: 408. Message: Request Timeout"
        );
    }
}
