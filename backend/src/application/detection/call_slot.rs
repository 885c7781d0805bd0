use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Admits one outstanding call to a device resource at a time.
///
/// The permit is held for as long as the call's future lives, so a call whose
/// task was aborted keeps the slot until the runtime has actually dropped it.
#[derive(Debug, Clone)]
pub struct CallSlot(Arc<Semaphore>);

impl CallSlot {
    pub fn new() -> Self {
        Self(Arc::new(Semaphore::new(1)))
    }

    /// Claim the slot only if it is free right now.
    pub fn try_claim(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.0).try_acquire_owned().ok()
    }

    /// Wait for the slot. `None` only if the slot was closed.
    pub async fn claim(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.0).acquire_owned().await.ok()
    }

    pub fn is_busy(&self) -> bool {
        self.0.available_permits() == 0
    }
}

impl Default for CallSlot {
    fn default() -> Self {
        Self::new()
    }
}
