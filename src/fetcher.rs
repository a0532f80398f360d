//! Feed retrieval collaborator
//!
//! The loader treats retrieval as an opaque asynchronous step behind the
//! [`Fetcher`] trait. The built-in [`HttpFetcher`] retrieves feeds over
//! HTTP(S); tests inject stubs with canned payloads.

use async_trait::async_trait;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{Error, Result, TransportError};

/// Retrieves the raw bytes of a feed for a URI
///
/// Implementations are invoked from the worker only and must be shareable
/// across threads. Failures are reported as [`TransportError`] values so the
/// loader can capture them on the task without tearing down the worker.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the payload behind `uri`
    async fn fetch(&self, uri: &str) -> std::result::Result<Vec<u8>, TransportError>;
}

/// HTTP(S) fetcher backed by a shared [`reqwest::Client`]
///
/// The client is built once with the configured timeout and user agent and
/// reused for every request.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build an HTTP fetcher from fetch configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                Error::Transport(TransportError::Request(format!(
                    "failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> std::result::Result<Vec<u8>, TransportError> {
        let url = Url::parse(uri)
            .map_err(|e| TransportError::Request(format!("invalid URI '{}': {}", uri, e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        // Check HTTP status before reading the response body
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unrecognized status")
                    .to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(body.to_vec())
    }
}
