use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Single-slot request guard: at most one exchange holds the slot.
#[derive(Debug, Clone)]
pub struct RequestGuard {
    slot: Arc<Semaphore>,
}

/// Proof that an exchange owns the slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct InFlight {
    _permit: OwnedSemaphorePermit,
}

impl Default for RequestGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGuard {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claim the slot, or `None` if an exchange is already in flight
    pub fn try_begin(&self) -> Option<InFlight> {
        self.slot
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| InFlight { _permit: permit })
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }
}
