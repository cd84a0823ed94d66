//! Admission control for concurrent fetch sequences
//!
//! A [`ConcurrencyGate`] hands out [`GatePermit`]s. Holding a permit is what
//! entitles a task to run its fetch sequence; dropping the permit releases the
//! slot, so release happens on every exit path including panics and aborted
//! tasks.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Error, Result};

/// Trait for admission control primitives
#[async_trait]
pub trait ConcurrencyGate: Send + Sync {
    /// Wait until a slot is free and take it
    ///
    /// The slot is released when the returned permit is dropped.
    async fn acquire(&self) -> Result<GatePermit>;

    /// Number of permits currently held
    fn in_flight(&self) -> usize;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Lease on one gate slot
#[must_use = "the slot is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct GatePermit {
    _semaphore: Option<OwnedSemaphorePermit>,
    in_flight: Arc<AtomicUsize>,
}

impl GatePermit {
    fn new(semaphore: Option<OwnedSemaphorePermit>, in_flight: Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            _semaphore: semaphore,
            in_flight,
        }
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Gate admitting at most `limit` holders at once
///
/// Backed by `tokio::sync::Semaphore`, which queues waiters in FIFO order, so
/// a waiting task is never overtaken indefinitely.
///
/// ```
/// use profile_fetch::gate::{ConcurrencyGate, SemaphoreGate};
///
/// # #[tokio::main]
/// # async fn main() -> profile_fetch::Result<()> {
/// let gate = SemaphoreGate::new(2);
/// let first = gate.acquire().await?;
/// let _second = gate.acquire().await?;
/// assert_eq!(gate.in_flight(), 2);
///
/// drop(first);
/// assert_eq!(gate.in_flight(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SemaphoreGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
    in_flight: Arc<AtomicUsize>,
}

impl SemaphoreGate {
    /// Create a gate with `limit` slots
    ///
    /// A limit of zero is raised to one so the gate can always make progress.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Maximum number of simultaneous holders
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots free right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[async_trait]
impl ConcurrencyGate for SemaphoreGate {
    async fn acquire(&self) -> Result<GatePermit> {
        // Only fails if the semaphore was closed; nothing in this crate closes it
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| Error::GateClosed)?;
        Ok(GatePermit::new(Some(permit), Arc::clone(&self.in_flight)))
    }

    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn name(&self) -> &'static str {
        "semaphore"
    }
}

/// Gate that never makes anyone wait
///
/// Used to exercise a fetcher in isolation; it still counts holders.
#[derive(Clone, Debug, Default)]
pub struct UnboundedGate {
    in_flight: Arc<AtomicUsize>,
}

impl UnboundedGate {
    /// Create a new unbounded gate
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConcurrencyGate for UnboundedGate {
    async fn acquire(&self) -> Result<GatePermit> {
        Ok(GatePermit::new(None, Arc::clone(&self.in_flight)))
    }

    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn name(&self) -> &'static str {
        "unbounded"
    }
}
