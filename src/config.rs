//! Configuration types for profile-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Top-level configuration
///
/// Every field has a default, so `Config::default()` only needs an API key
/// (and usually nothing else) to talk to the production endpoint.
///
/// ```
/// use profile_fetch::Config;
///
/// let config: Config = serde_json::from_str(
///     r#"{ "concurrency_limit": 5, "retry": { "max_attempts": 2 } }"#,
/// ).unwrap();
/// assert_eq!(config.concurrency_limit, 5);
/// assert_eq!(config.retry.max_attempts, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of fetch sequences holding a gate slot at once (default: 20)
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry policy applied to each identifier
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Check that the configuration can drive a batch
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(Error::config(
                "concurrency_limit",
                "concurrency_limit must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts",
                "max_attempts must be at least 1",
            ));
        }
        self.api.endpoint_url()?;
        Ok(())
    }
}

/// Remote profile API settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Profile lookup endpoint; the identifier is appended as `username=<id>`
    #[serde(default = "default_profile_endpoint")]
    pub profile_endpoint: String,

    /// Bearer credential sent on profile requests only (never on image requests)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request transport timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            profile_endpoint: default_profile_endpoint(),
            api_key: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Parse `profile_endpoint` into a URL
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.profile_endpoint).map_err(|e| {
            Error::config(
                "api.profile_endpoint",
                format!("invalid profile endpoint {:?}: {e}", self.profile_endpoint),
            )
        })
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("profile_endpoint", &self.profile_endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Retry policy for one identifier's fetch sequence
///
/// The backoff is fixed: no jitter and no growth between attempts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per identifier, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts (default: 1 second)
    #[serde(default = "default_backoff", with = "millis_serde")]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: default_backoff(),
        }
    }
}

fn default_concurrency_limit() -> usize {
    20
}

fn default_profile_endpoint() -> String {
    "https://tw-go-data-api.c2.108capital.ltd/open/profile".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> Duration {
    Duration::from_secs(1)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
