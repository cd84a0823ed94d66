//! Per-identifier fetch with retry
//!
//! [`ProfileFetcher`] turns one [`Identifier`] into one [`FetchOutcome`]. An
//! attempt is the whole chained sequence: profile GET, JSON decode, and the
//! avatar GET when the profile references one. A failure anywhere in that
//! sequence fails the attempt, and the next attempt starts again from the
//! profile request. A `Success` therefore always carries the avatar bytes
//! fetched by the same attempt that produced the profile.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use url::Url;

use crate::config::{ApiConfig, RetryConfig};
use crate::error::{Error, Result, TransportError};
use crate::retry::with_retry;
use crate::transport::Transport;
use crate::types::{ErrorDetail, FetchOutcome, Identifier, Record};

/// Fetches one profile and its avatar under a fixed retry policy
#[derive(Clone)]
pub struct ProfileFetcher {
    transport: Arc<dyn Transport>,
    endpoint: Url,
    profile_headers: HeaderMap,
    retry: RetryConfig,
}

impl std::fmt::Debug for ProfileFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileFetcher")
            .field("endpoint", &self.endpoint.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ProfileFetcher {
    /// Create a fetcher for the endpoint and credential in `api`
    ///
    /// Fails if the endpoint is not a valid URL or the API key cannot be sent
    /// as a header value.
    pub fn new(
        transport: Arc<dyn Transport>,
        api: &ApiConfig,
        retry: RetryConfig,
    ) -> Result<Self> {
        let endpoint = api.endpoint_url()?;

        let mut profile_headers = HeaderMap::new();
        if let Some(key) = &api.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                Error::config("api.api_key", "API key contains characters not allowed in a header")
            })?;
            value.set_sensitive(true);
            profile_headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            transport,
            endpoint,
            profile_headers,
            retry,
        })
    }

    /// Retry policy in use
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Profile lookup URL for `identifier`
    pub fn profile_url(&self, identifier: &Identifier) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("username", identifier.as_str());
        url
    }

    /// Fetch `identifier`, retrying the full profile + avatar sequence
    ///
    /// Never fails: exhausted retries become [`FetchOutcome::Failure`] with a
    /// message naming the identifier and the last cause. Every event logged
    /// while fetching, retry warnings included, is inside a `fetch` span
    /// carrying the identifier.
    #[tracing::instrument(name = "fetch", skip_all, fields(identifier = %identifier))]
    pub async fn fetch(&self, identifier: &Identifier) -> FetchOutcome {
        let url = self.profile_url(identifier);

        let result = with_retry(&self.retry, |attempt| {
            let url = &url;
            async move {
                tracing::debug!(attempt, "fetching profile");
                self.fetch_once(url).await.inspect_err(|e| {
                    tracing::debug!(attempt, error = %e, "attempt failed");
                })
            }
        })
        .await;

        match result {
            Ok(record) => FetchOutcome::Success(record),
            Err(e) => FetchOutcome::Failure(ErrorDetail {
                identifier: identifier.clone(),
                message: format!("An error occurred for @{identifier}: {e}"),
            }),
        }
    }

    /// One attempt: profile GET, decode, then the avatar GET if referenced
    async fn fetch_once(&self, url: &Url) -> std::result::Result<Record, TransportError> {
        let response = self.transport.get(url, &self.profile_headers).await?;
        let mut record: Record =
            serde_json::from_slice(&response.body).map_err(|e| TransportError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let avatar_url = match record.avatar_reference() {
            Some(reference) => {
                self.endpoint
                    .join(reference)
                    .map_err(|e| TransportError::InvalidUrl {
                        url: reference.to_string(),
                        message: e.to_string(),
                    })?
            }
            None => return Ok(record),
        };

        // Avatar hosts get no credential
        let avatar = self.transport.get(&avatar_url, &HeaderMap::new()).await?;
        record.avatar_image = Some(avatar.body);
        Ok(record)
    }
}
