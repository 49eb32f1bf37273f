//! Ingestion requester: one POST round trip from events to result events.
//!
//! Encodes the events, resolves headers and caller options into a transport
//! request, sends it, and interprets the response.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use streamx_core::{CloudEvent, JsonEventCodec};
use tracing::{Instrument, debug_span};
use url::Url;

use crate::error::{ClientError, Result};
use crate::reqwest_transport::{ReqwestTransport, TransportConfig};
use crate::response::ResponseInterpreter;
use crate::transport::{HttpTransport, RequestOptions, TransportRequest};

/// Executes ingestion POST requests. Implement this to replace the whole
/// request/response handling of the client.
#[async_trait]
pub trait HttpRequester: Send + Sync {
    /// Posts `events` to `endpoint` and returns one result event per input
    /// event, in input order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if encoding, the HTTP call, or the endpoint
    /// reports a failure.
    async fn post(
        &self,
        endpoint: &Url,
        headers: &BTreeMap<String, String>,
        events: &[CloudEvent],
        options: &RequestOptions,
    ) -> Result<Vec<CloudEvent>>;
}

/// Default `HttpRequester` over an injected `HttpTransport`.
#[derive(Clone)]
pub struct IngestionRequester {
    transport: Arc<dyn HttpTransport>,
    codec: JsonEventCodec,
    interpreter: ResponseInterpreter,
}

impl std::fmt::Debug for IngestionRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionRequester")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl IngestionRequester {
    /// Creates a requester sending through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        let codec = JsonEventCodec::new();
        Self {
            transport,
            codec,
            interpreter: ResponseInterpreter::new(codec),
        }
    }

    /// Creates a requester over a default `ReqwestTransport`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_default_transport(config: &TransportConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(config)?)))
    }
}

#[async_trait]
impl HttpRequester for IngestionRequester {
    async fn post(
        &self,
        endpoint: &Url,
        headers: &BTreeMap<String, String>,
        events: &[CloudEvent],
        options: &RequestOptions,
    ) -> Result<Vec<CloudEvent>> {
        let span = debug_span!(
            "ingestion_request",
            uri = %endpoint,
            events = events.len()
        );

        async move {
            let serialized = self
                .codec
                .encode(events)
                .map_err(ClientError::Serialization)?;
            let content_type = serialized.content_type();

            let request = TransportRequest::new(
                endpoint.clone(),
                headers.clone(),
                serialized.into_body(),
                content_type,
            )
            .with_options(options);

            tracing::debug!(content_type, "Sending ingestion request");

            let response = self
                .transport
                .post(request)
                .await
                .map_err(|source| ClientError::Transport {
                    uri: endpoint.to_string(),
                    source,
                })?;

            let result = self.interpreter.interpret(response).await?;
            tracing::debug!(results = result.len(), "Ingestion accepted");
            Ok(result)
        }
        .instrument(span)
        .await
    }
}
