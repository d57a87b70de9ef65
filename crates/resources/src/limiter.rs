//! Bounded-concurrency gate with a completion barrier
//!
//! A [`Limiter`] admits at most `capacity` operations at a time and lets one
//! caller wait until every admitted operation has finished. Admission hands
//! out a [`LimiterPermit`]; dropping it is the only way to release, so every
//! acquire is paired with exactly one release.

use gotools_errors::Error;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::task::task_tracker::TaskTrackerToken;
use tokio_util::task::TaskTracker;

use crate::semaphore::{acquire_semaphore_permit, create_semaphore};

/// Counting semaphore plus a barrier over in-flight operations
#[derive(Debug, Clone)]
pub struct Limiter {
    name: String,
    capacity: usize,
    slots: Arc<Semaphore>,
    tracker: TaskTracker,
}

/// Proof of admission into a [`Limiter`]
///
/// Holds one slot and one barrier registration; both are returned when the
/// permit is dropped.
#[derive(Debug)]
#[must_use = "dropping the permit releases the slot immediately"]
pub struct LimiterPermit {
    _slot: OwnedSemaphorePermit,
    _token: TaskTrackerToken,
}

impl LimiterPermit {
    /// Release the slot and mark the operation complete
    pub fn release(self) {
        drop(self);
    }
}

impl Limiter {
    /// Create a limiter admitting `capacity` concurrent operations
    ///
    /// A capacity of zero is raised to one so the limiter can always make
    /// progress.
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            slots: create_semaphore(capacity),
            tracker: TaskTracker::new(),
        }
    }

    /// Wait for a free slot and register the operation with the barrier
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying semaphore has been closed.
    pub async fn acquire(&self) -> Result<LimiterPermit, Error> {
        let slot = acquire_semaphore_permit(self.slots.clone(), &self.name).await?;
        Ok(LimiterPermit {
            _slot: slot,
            _token: self.tracker.token(),
        })
    }

    /// Wait until every permit acquired so far has been released
    ///
    /// Returns immediately when nothing is in flight.
    pub async fn join(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of concurrent operations
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    #[must_use]
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Operations admitted and not yet released
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}
