//! Module `budget`
//!
//! A counting permit pool for one traffic class. Waiters are served in FIFO
//! order (tokio's semaphore is fair), and a permit returns its slot when it
//! is dropped, so release happens exactly once on every exit path.

use log::debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::admission::TrafficClass;
use crate::error::AdmissionError;

/// Capacity-limited budget for one traffic class.
pub struct AdmissionBudget {
    class: TrafficClass,
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

/// One slot of an [`AdmissionBudget`], held between acquire and release.
#[derive(Debug)]
pub struct AdmissionPermit {
    class: TrafficClass,
    _permit: OwnedSemaphorePermit,
}

impl AdmissionBudget {
    /// Creates a budget with `capacity` slots. Capacity must be non-zero or
    /// every acquire waits forever; configuration validation enforces this.
    pub fn new(class: TrafficClass, capacity: usize) -> Self {
        Self {
            class,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Waits for a free slot until `cancel` completes, whichever comes first.
    ///
    /// A slot that is free right away is always taken, even if `cancel` is
    /// already complete. On cancellation nothing is acquired and
    /// [`AdmissionError::Overloaded`] is returned.
    pub async fn acquire<C>(&self, cancel: C) -> Result<AdmissionPermit, AdmissionError>
    where
        C: Future,
    {
        let semaphore = Arc::clone(&self.semaphore);

        tokio::select! {
            biased;
            permit = semaphore.acquire_owned() => match permit {
                Ok(permit) => {
                    debug!("Acquired {} slot ({}/{})", self.class, self.in_use(), self.capacity);
                    Ok(AdmissionPermit { class: self.class, _permit: permit })
                }
                // The semaphore is never closed; treat it as exhausted if it ever is.
                Err(_) => Err(self.overloaded()),
            },
            _ = cancel => {
                debug!("Gave up waiting for {} slot ({} in use)", self.class, self.in_use());
                Err(self.overloaded())
            }
        }
    }

    fn overloaded(&self) -> AdmissionError {
        AdmissionError::Overloaded {
            class: self.class,
            capacity: self.capacity,
        }
    }
}

impl AdmissionPermit {
    /// Returns the slot to its budget. Dropping the permit does the same.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        debug!("Released {} slot", self.class);
    }
}
