//! Test requesters: `HttpRequester` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use streamx_core::CloudEvent;
use streamx_ingestion::{
    HttpRequester, INGESTION_ENDPOINT_PATH, IngestionRequester, RequestOptions, Result,
};
use url::Url;

/// One call received by `StaticRequester`.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    /// Endpoint posted to.
    pub endpoint: Url,
    /// Headers passed by the publisher.
    pub headers: BTreeMap<String, String>,
    /// Events to send.
    pub events: Vec<CloudEvent>,
    /// Caller options.
    pub options: RequestOptions,
}

/// A requester that never touches the network. Records every call and
/// answers with the configured events.
#[derive(Debug, Default)]
pub struct StaticRequester {
    response: Vec<CloudEvent>,
    calls: Mutex<Vec<RecordedPost>>,
}

impl StaticRequester {
    /// Create a requester returning `response` from every call.
    #[must_use]
    pub fn returning(response: Vec<CloudEvent>) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all calls received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<RecordedPost> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpRequester for StaticRequester {
    async fn post(
        &self,
        endpoint: &Url,
        headers: &BTreeMap<String, String>,
        events: &[CloudEvent],
        options: &RequestOptions,
    ) -> Result<Vec<CloudEvent>> {
        self.calls.lock().unwrap().push(RecordedPost {
            endpoint: endpoint.clone(),
            headers: headers.clone(),
            events: events.to_vec(),
            options: options.clone(),
        });
        Ok(self.response.clone())
    }
}

/// A requester that swaps the default ingestion path for another one before
/// delegating to an `IngestionRequester`.
#[derive(Debug)]
pub struct PathRewritingRequester {
    ingestion_endpoint_path: String,
    inner: IngestionRequester,
}

impl PathRewritingRequester {
    /// Create a requester posting to `ingestion_endpoint_path` through `inner`.
    #[must_use]
    pub fn new(ingestion_endpoint_path: &str, inner: IngestionRequester) -> Self {
        Self {
            ingestion_endpoint_path: ingestion_endpoint_path.to_owned(),
            inner,
        }
    }
}

#[async_trait]
impl HttpRequester for PathRewritingRequester {
    async fn post(
        &self,
        endpoint: &Url,
        headers: &BTreeMap<String, String>,
        events: &[CloudEvent],
        options: &RequestOptions,
    ) -> Result<Vec<CloudEvent>> {
        let mut endpoint = endpoint.clone();
        let path = endpoint
            .path()
            .replace(INGESTION_ENDPOINT_PATH, &self.ingestion_endpoint_path);
        endpoint.set_path(&path);
        self.inner.post(&endpoint, headers, events, options).await
    }
}
