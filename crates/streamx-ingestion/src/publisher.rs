//! Publisher: the caller-facing send operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use streamx_core::CloudEvent;
use url::Url;

use crate::error::{ClientError, Result};
use crate::requester::HttpRequester;
use crate::transport::RequestOptions;

/// Name of the authorization header.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Ingestion endpoint contract. Implementations are reusable and hold no
/// per-call state.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Sends a list of events. The result holds one event per input event,
    /// in input order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if ingestion of any event fails.
    async fn send_multi(
        &self,
        events: &[CloudEvent],
        options: &RequestOptions,
    ) -> Result<Vec<CloudEvent>>;

    /// Sends a single event and returns its ingestion result.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if ingestion fails.
    async fn send(&self, event: &CloudEvent, options: &RequestOptions) -> Result<CloudEvent> {
        self.send_multi(std::slice::from_ref(event), options)
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::EmptySuccess)
    }
}

/// `Publisher` bound to one endpoint, one header set and one requester.
#[derive(Clone)]
pub struct RestPublisher {
    endpoint: Arc<Url>,
    headers: BTreeMap<String, String>,
    requester: Arc<dyn HttpRequester>,
}

impl std::fmt::Debug for RestPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPublisher")
            .field("endpoint", &self.endpoint.as_str())
            .field("authenticated", &self.headers.contains_key(AUTHORIZATION_HEADER))
            .finish_non_exhaustive()
    }
}

impl RestPublisher {
    /// Creates a publisher. A blank `auth_token` means no `Authorization`
    /// header is sent.
    #[must_use]
    pub fn new(
        endpoint: Arc<Url>,
        auth_token: Option<&str>,
        requester: Arc<dyn HttpRequester>,
    ) -> Self {
        Self {
            endpoint,
            headers: build_headers(auth_token),
            requester,
        }
    }

    /// The ingestion endpoint this publisher posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Headers sent with every request.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

#[async_trait]
impl Publisher for RestPublisher {
    async fn send_multi(
        &self,
        events: &[CloudEvent],
        options: &RequestOptions,
    ) -> Result<Vec<CloudEvent>> {
        self.requester
            .post(&self.endpoint, &self.headers, events, options)
            .await
    }
}

fn build_headers(auth_token: Option<&str>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if let Some(token) = auth_token.filter(|token| !token.trim().is_empty()) {
        headers.insert(AUTHORIZATION_HEADER.to_owned(), format!("Bearer {token}"));
    }
    headers
}
