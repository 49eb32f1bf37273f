//! Client configuration read from the environment.

use std::time::Duration;

use crate::builder::StreamxClientBuilder;
use crate::client::INGESTION_ENDPOINT_PATH;
use crate::error::{ClientError, Result};
use crate::reqwest_transport::TransportConfig;

/// Server base URL, e.g. `http://localhost:8080`. Required.
pub const URL_VAR: &str = "STREAMX_INGESTION_URL";
/// Ingestion endpoint path.
pub const PATH_VAR: &str = "STREAMX_INGESTION_PATH";
/// Bearer token.
pub const TOKEN_VAR: &str = "STREAMX_AUTH_TOKEN";
/// Request timeout in whole seconds.
pub const TIMEOUT_VAR: &str = "STREAMX_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for a client built from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL.
    pub server_url: String,
    /// Ingestion endpoint path.
    pub ingestion_endpoint_path: String,
    /// Bearer token, if any.
    pub auth_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if `STREAMX_INGESTION_URL` is
    /// missing or `STREAMX_TIMEOUT_SECS` is not a valid number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server_url = lookup(URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Configuration(format!("{URL_VAR} environment variable must be set"))
            })?;
        let ingestion_endpoint_path =
            lookup(PATH_VAR).unwrap_or_else(|| INGESTION_ENDPOINT_PATH.to_owned());
        let auth_token = lookup(TOKEN_VAR).filter(|value| !value.trim().is_empty());
        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(value) => value.trim().parse::<u64>().map_err(|e| {
                ClientError::Configuration(format!("{TIMEOUT_VAR} must be a valid u64: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            server_url,
            ingestion_endpoint_path,
            auth_token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Turns the configuration into a builder with a default transport.
    pub fn into_builder(self) -> StreamxClientBuilder {
        let mut builder = StreamxClientBuilder::new(self.server_url)
            .ingestion_endpoint_path(self.ingestion_endpoint_path)
            .transport_config(TransportConfig {
                timeout: self.timeout,
                ..TransportConfig::default()
            });
        if let Some(token) = self.auth_token {
            builder = builder.auth_token(token);
        }
        builder
    }
}
