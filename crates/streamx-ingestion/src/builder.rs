//! Builder for `StreamxClient`.

use std::sync::Arc;

use url::Url;

use crate::client::{INGESTION_ENDPOINT_PATH, StreamxClient};
use crate::error::{ClientError, Result};
use crate::reqwest_transport::{ReqwestTransport, TransportConfig};
use crate::requester::{HttpRequester, IngestionRequester};
use crate::transport::HttpTransport;

/// Configures and validates a `StreamxClient`.
///
/// Transport selection, first match wins: a custom requester, a custom
/// transport, a custom `reqwest::Client`, a default `reqwest` transport built
/// from the transport config.
#[must_use]
pub struct StreamxClientBuilder {
    server_url: String,
    ingestion_endpoint_path: Option<String>,
    auth_token: Option<String>,
    http_requester: Option<Arc<dyn HttpRequester>>,
    http_transport: Option<Arc<dyn HttpTransport>>,
    http_client: Option<reqwest::Client>,
    transport_config: TransportConfig,
}

impl std::fmt::Debug for StreamxClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamxClientBuilder")
            .field("server_url", &self.server_url)
            .field("ingestion_endpoint_path", &self.ingestion_endpoint_path)
            .field("custom_requester", &self.http_requester.is_some())
            .field("custom_transport", &self.http_transport.is_some())
            .field("transport_config", &self.transport_config)
            .finish_non_exhaustive()
    }
}

impl StreamxClientBuilder {
    /// Starts a builder for the server at `server_url`, e.g.
    /// `http://localhost:8080`.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ingestion_endpoint_path: None,
            auth_token: None,
            http_requester: None,
            http_transport: None,
            http_client: None,
            transport_config: TransportConfig::default(),
        }
    }

    /// Overrides the ingestion path. Defaults to [`INGESTION_ENDPOINT_PATH`].
    pub fn ingestion_endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.ingestion_endpoint_path = Some(path.into());
        self
    }

    /// Sets the token sent as `Authorization: Bearer <token>`.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Replaces the whole request/response handling. Takes precedence over
    /// every transport setting.
    pub fn http_requester(mut self, requester: Arc<dyn HttpRequester>) -> Self {
        self.http_requester = Some(requester);
        self
    }

    /// Sends through a custom transport. Ignored when a custom requester is
    /// set.
    pub fn http_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.http_transport = Some(transport);
        self
    }

    /// Uses a preconfigured `reqwest::Client` for the default transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Settings for the default transport's HTTP client.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// Validates the configuration and builds the client. No request is made.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidEndpoint` if the endpoint URI is relative
    /// or malformed, and `ClientError::Configuration` if the default HTTP
    /// client cannot be built.
    pub fn build(self) -> Result<StreamxClient> {
        let path = self
            .ingestion_endpoint_path
            .as_deref()
            .unwrap_or(INGESTION_ENDPOINT_PATH);
        let endpoint = build_absolute_uri(&self.server_url, path)?;

        let requester: Arc<dyn HttpRequester> = match (self.http_requester, self.http_transport) {
            (Some(requester), _) => requester,
            (None, Some(transport)) => Arc::new(IngestionRequester::new(transport)),
            (None, None) => {
                let transport = match self.http_client {
                    Some(client) => ReqwestTransport::from_client(client),
                    None => ReqwestTransport::new(&self.transport_config)?,
                };
                Arc::new(IngestionRequester::new(Arc::new(transport)))
            }
        };

        tracing::debug!(endpoint = %endpoint, "Built StreamX client");

        Ok(StreamxClient::new(endpoint, self.auth_token, requester))
    }
}

/// Joins server URL and path and checks the result is an absolute HTTP URI.
fn build_absolute_uri(server_url: &str, path: &str) -> Result<Url> {
    let uri = format!("{server_url}{path}");
    let malformed = |reason: String| ClientError::InvalidEndpoint {
        uri: uri.clone(),
        reason,
    };

    let parsed = match Url::parse(&uri) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(malformed("Relative URI is not supported.".to_owned()));
        }
        Err(e) => return Err(malformed(format!("Unable to parse URI: {uri}. {e}"))),
    };

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(malformed(format!("Unsupported URI scheme: {scheme}.")));
    }
    if !has_authority(&uri, scheme) {
        return Err(malformed(format!("Unable to parse URI: {uri}. Missing host.")));
    }

    Ok(parsed)
}

/// Whether `uri` spells out a non-empty authority after its scheme. The URL
/// parser repairs `https:///path` and `http:host` into a host, so the raw
/// text is checked instead.
fn has_authority(uri: &str, scheme: &str) -> bool {
    uri.trim_start()
        .get(scheme.len()..)
        .and_then(|rest| rest.strip_prefix("://"))
        .and_then(|authority| authority.chars().next())
        .is_some_and(|first| !matches!(first, '/' | '?' | '#'))
}
