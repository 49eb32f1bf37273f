//! StreamX Ingestion — HTTP publisher for CloudEvents.
//!
//! Build a [`StreamxClient`] with [`StreamxClient::builder`], mint a
//! [`RestPublisher`] from it, and call [`Publisher::send`] or
//! [`Publisher::send_multi`]. Each call is one POST round trip; there is no
//! buffering and no retry.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod publisher;
pub mod reqwest_transport;
pub mod requester;
pub mod response;
pub mod transport;

pub use builder::StreamxClientBuilder;
pub use client::{INGESTION_ENDPOINT_PATH, StreamxClient};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, Result};
pub use publisher::{Publisher, RestPublisher};
pub use reqwest_transport::{ReqwestTransport, TransportConfig};
pub use requester::{HttpRequester, IngestionRequester};
pub use response::{ResponseClass, ResponseInterpreter, classify_status};
pub use transport::{
    HttpTransport, RequestOptions, ResponseBody, TransportError, TransportRequest,
    TransportResponse,
};
