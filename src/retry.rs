//! Retry logic with fixed backoff
//!
//! Every error is treated as transient: the operation is re-run until it
//! succeeds or `max_attempts` attempts have been made, sleeping a fixed
//! `backoff` between attempts. There is no jitter and no growth of the delay.
//!
//! # Example
//!
//! ```no_run
//! use profile_fetch::retry::with_retry;
//! use profile_fetch::config::RetryConfig;
//!
//! # async fn example() -> Result<(), String> {
//! let config = RetryConfig::default();
//! let value = with_retry(&config, |attempt| async move {
//!     if attempt < 2 {
//!         Err(format!("attempt {attempt} failed"))
//!     } else {
//!         Ok(42)
//!     }
//! })
//! .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use std::future::Future;

/// Execute an async operation, retrying every failure with a fixed backoff
///
/// `operation` receives the 1-based attempt number. At least one attempt is
/// always made, even if `config.max_attempts` is zero.
///
/// Returns the first successful result, or the error from the last attempt.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = config.backoff.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::time::sleep(config.backoff).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    attempts = attempt,
                    "Operation failed after all retry attempts exhausted"
                );
                return Err(e);
            }
        }
    }
}
