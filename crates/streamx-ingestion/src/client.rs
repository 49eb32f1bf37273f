//! StreamX client: mints publishers sharing one frozen configuration.

use std::sync::Arc;

use url::Url;

use crate::builder::StreamxClientBuilder;
use crate::publisher::RestPublisher;
use crate::requester::HttpRequester;

/// Default path of the REST ingestion endpoint.
pub const INGESTION_ENDPOINT_PATH: &str = "/ingestion/v2/cloudevents";

/// Client for the StreamX ingestion service.
///
/// Cheap to clone. Every publisher it creates shares its endpoint, token and
/// requester.
#[derive(Clone)]
pub struct StreamxClient {
    endpoint: Arc<Url>,
    auth_token: Option<Arc<str>>,
    requester: Arc<dyn HttpRequester>,
}

impl std::fmt::Debug for StreamxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamxClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl StreamxClient {
    /// Starts configuring a client for the server at `server_url`.
    #[must_use]
    pub fn builder(server_url: impl Into<String>) -> StreamxClientBuilder {
        StreamxClientBuilder::new(server_url)
    }

    pub(crate) fn new(
        endpoint: Url,
        auth_token: Option<String>,
        requester: Arc<dyn HttpRequester>,
    ) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            auth_token: auth_token.map(Arc::from),
            requester,
        }
    }

    /// Creates a new publisher.
    #[must_use]
    pub fn new_publisher(&self) -> RestPublisher {
        RestPublisher::new(
            Arc::clone(&self.endpoint),
            self.auth_token.as_deref(),
            Arc::clone(&self.requester),
        )
    }

    /// The absolute ingestion endpoint URI.
    #[must_use]
    pub fn ingestion_endpoint(&self) -> &Url {
        &self.endpoint
    }
}
