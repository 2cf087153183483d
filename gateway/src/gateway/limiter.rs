//! Process-wide bound on simultaneous calls to the hosting service.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::hosting::DispatchError;

/// Counting permit pool shared by every dispatcher.
///
/// Cloning is cheap and shares the pool. A capacity of zero means
/// unlimited: acquisition is skipped entirely.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Option<Arc<Semaphore>>,
    capacity: usize,
}

/// Held for the duration of one hosting-service call. Dropping it returns
/// the permit, whichever way the call ends.
#[derive(Debug)]
pub struct LimiterPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: (capacity > 0).then(|| Arc::new(Semaphore::new(capacity))),
            capacity,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// Configured capacity, 0 when unlimited.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait until a permit is free.
    pub async fn acquire(&self) -> Result<LimiterPermit, DispatchError> {
        let permit = match &self.semaphore {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| DispatchError::Transport(format!("Semaphore error: {}", e)))?,
            ),
            None => None,
        };
        Ok(LimiterPermit { _permit: permit })
    }

    #[cfg(test)]
    pub(crate) fn available_permits(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }
}
