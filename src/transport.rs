//! Single-attempt HTTP transport
//!
//! The [`Transport`] trait is the seam between the retry logic and the
//! network. Implementations perform exactly one request per call, hold no
//! per-call mutable state, and may be called concurrently.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;

/// Successful (2xx) response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Trait for issuing a single HTTP GET
///
/// Non-2xx statuses are reported as [`TransportError::Status`], never as a
/// successful response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one GET request against `url` with the given headers
    async fn get(
        &self,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`
///
/// Cloning is cheap; clones share the client's connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("profile-fetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        tracing::debug!(url = %url, "sending GET request");

        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
