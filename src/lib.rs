//! # profile-fetch
//!
//! Concurrent batch fetcher for profile records and their avatar images.
//!
//! Given an ordered list of identifiers, [`BatchFetcher::fetch_all`] returns
//! one [`FetchOutcome`] per identifier, in the same order:
//! - at most `concurrency_limit` fetch sequences run at once (default 20),
//! - each sequence (profile request, then avatar request) is retried as a
//!   unit up to `retry.max_attempts` times with a fixed backoff,
//! - a failing identifier yields a [`FetchOutcome::Failure`] in its own slot
//!   and never disturbs the rest of the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use profile_fetch::{BatchFetcher, BatchReport, Config, Identifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.api.api_key = Some(std::env::var("PROFILE_API_KEY")?);
//!
//!     let batch = BatchFetcher::new(&config)?;
//!     let identifiers = Identifier::parse_list("elonmusk, jack, satyanadella");
//!     let report: BatchReport = batch.fetch_all(&identifiers).await.into_iter().collect();
//!
//!     for (_, record) in &report.successes {
//!         println!("{} joined {:?}", record.username, record.joined_date());
//!     }
//!     for (_, failure) in &report.failures {
//!         eprintln!("{}", failure.message);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch fan-out/fan-in
pub mod batch;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Per-identifier fetch with retry
pub mod fetcher;
/// Concurrency gate
pub mod gate;
/// Retry logic with fixed backoff
pub mod retry;
/// Single-attempt HTTP transport
pub mod transport;
/// Core types
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use batch::BatchFetcher;
pub use config::{ApiConfig, Config, RetryConfig};
pub use error::{Error, Result, TransportError};
pub use fetcher::ProfileFetcher;
pub use gate::{ConcurrencyGate, GatePermit, SemaphoreGate, UnboundedGate};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{BatchReport, ErrorDetail, FetchOutcome, Identifier, Record};
