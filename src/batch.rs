//! Batch fan-out/fan-in
//!
//! [`BatchFetcher`] spawns one task per identifier, lets each task run its
//! fetch sequence only while holding a gate permit, and joins the task handles
//! in input order so `outcomes[i]` always belongs to `identifiers[i]`.

use futures::future::join_all;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::ProfileFetcher;
use crate::gate::{ConcurrencyGate, SemaphoreGate};
use crate::transport::{HttpTransport, Transport};
use crate::types::{ErrorDetail, FetchOutcome, Identifier};

/// Fetches a batch of identifiers concurrently under a concurrency gate
///
/// # Example
///
/// ```no_run
/// use profile_fetch::{BatchFetcher, Config, Identifier};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut config = Config::default();
///     config.api.api_key = Some("my-api-key".to_string());
///
///     let batch = BatchFetcher::new(&config)?;
///     let outcomes = batch
///         .fetch_all(&Identifier::parse_list("elonmusk, jack, satyanadella"))
///         .await;
///
///     for outcome in outcomes {
///         match outcome.record() {
///             Some(record) => println!("{}: {} followers", record.username, record.followers_count),
///             None => println!("{}", outcome.error().map(|e| e.message.as_str()).unwrap_or_default()),
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BatchFetcher {
    fetcher: Arc<ProfileFetcher>,
    gate: Arc<dyn ConcurrencyGate>,
}

impl std::fmt::Debug for BatchFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchFetcher")
            .field("fetcher", &self.fetcher)
            .field("gate", &self.gate.name())
            .field("in_flight", &self.gate.in_flight())
            .finish()
    }
}

impl BatchFetcher {
    /// Build a fetcher talking HTTP with the settings in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(config.api.request_timeout)?);
        Self::with_transport(config, transport)
    }

    /// Build a fetcher using a caller-supplied transport
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let fetcher = ProfileFetcher::new(transport, &config.api, config.retry.clone())?;
        Ok(Self::from_parts(
            fetcher,
            Arc::new(SemaphoreGate::new(config.concurrency_limit)),
        ))
    }

    /// Assemble from an existing fetcher and gate
    pub fn from_parts(fetcher: ProfileFetcher, gate: Arc<dyn ConcurrencyGate>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            gate,
        }
    }

    /// The gate limiting concurrent fetch sequences
    pub fn gate(&self) -> &Arc<dyn ConcurrencyGate> {
        &self.gate
    }

    /// Fetch every identifier and return one outcome per input, in input order
    ///
    /// Duplicates are fetched independently. Returns only after every
    /// identifier has resolved. A task that panics yields a `Failure` at its
    /// own position and does not affect the others.
    pub async fn fetch_all(&self, identifiers: &[Identifier]) -> Vec<FetchOutcome> {
        if identifiers.is_empty() {
            return Vec::new();
        }

        tracing::info!(
            count = identifiers.len(),
            gate = self.gate.name(),
            "starting batch fetch"
        );

        let handles: Vec<_> = identifiers
            .iter()
            .cloned()
            .map(|identifier| {
                let fetcher = Arc::clone(&self.fetcher);
                let gate = Arc::clone(&self.gate);
                tokio::spawn(async move {
                    fetch_gated(&fetcher, gate.as_ref(), &identifier).await
                })
            })
            .collect();

        let outcomes: Vec<FetchOutcome> = join_all(handles)
            .await
            .into_iter()
            .zip(identifiers)
            .map(|(joined, identifier)| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(identifier = %identifier, error = %e, "fetch task panicked");
                    FetchOutcome::Failure(ErrorDetail {
                        identifier: identifier.clone(),
                        message: format!("An error occurred for @{identifier}: {e}"),
                    })
                }
            })
            .collect();

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            total = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "batch fetch complete"
        );

        outcomes
    }
}

/// Run one identifier's fetch sequence while holding a gate permit
async fn fetch_gated(
    fetcher: &ProfileFetcher,
    gate: &dyn ConcurrencyGate,
    identifier: &Identifier,
) -> FetchOutcome {
    let _permit = match gate.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            return FetchOutcome::Failure(ErrorDetail {
                identifier: identifier.clone(),
                message: format!("An error occurred for @{identifier}: {e}"),
            });
        }
    };
    fetcher.fetch(identifier).await
}
