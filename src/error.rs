//! Error types for profile-fetch
//!
//! Two layers of errors exist:
//! - [`TransportError`] describes why a single HTTP attempt failed. The fetcher
//!   absorbs these and folds the last one into a
//!   [`FetchOutcome::Failure`](crate::types::FetchOutcome::Failure).
//! - [`Error`] covers construction-time problems (invalid configuration,
//!   invalid identifiers, HTTP client setup) that callers must handle.

use thiserror::Error;

/// Result type alias for profile-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for profile-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "concurrency_limit")
        key: Option<String>,
    },

    /// Identifier was empty or whitespace-only
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The underlying HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The concurrency gate was closed while a task waited for a slot
    #[error("concurrency gate closed")]
    GateClosed,
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Failure of a single outbound HTTP attempt
///
/// Every variant is treated the same way by the retry loop: a 404 is retried
/// exactly like a timeout.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server answered with a non-2xx status
    #[error("HTTP error {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// Connection, DNS, TLS or body-read failure
    #[error("request to {url} failed: {message}")]
    Network {
        /// Requested URL
        url: String,
        /// Underlying cause as reported by the HTTP client
        message: String,
    },

    /// Request did not complete within the transport timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// Response body could not be decoded
    #[error("malformed response body from {url}: {message}")]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// A URL taken from a response could not be parsed
    #[error("invalid URL {url:?}: {message}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser message
        message: String,
    },
}

impl TransportError {
    /// Classify a reqwest failure for `url`
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}
