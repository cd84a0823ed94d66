//! Test configuration helpers pointing the fetcher at a mock server

use profile_fetch::{ApiConfig, Config, RetryConfig};
use std::time::Duration;
use wiremock::MockServer;

/// Path the mock profile endpoint is mounted on
pub const PROFILE_PATH: &str = "/open/profile";

/// API key the tests configure
pub const TEST_API_KEY: &str = "test-api-key";

/// Config aimed at `server` with zero backoff so retries run instantly
pub fn config_for(server: &MockServer) -> Config {
    Config {
        concurrency_limit: 20,
        api: ApiConfig {
            profile_endpoint: format!("{}{}", server.uri(), PROFILE_PATH),
            api_key: Some(TEST_API_KEY.to_string()),
            request_timeout: Duration::from_secs(5),
        },
        retry: RetryConfig {
            max_attempts: 3,
            backoff: Duration::ZERO,
        },
    }
}
