//! Per-session mutual exclusion for turns.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::SessionId;

/// Hands out one async mutex per session id.
///
/// Turns on the same session queue behind each other; turns on different
/// sessions never contend beyond the brief map lookup. Idle entries are
/// pruned on the next acquisition.
#[derive(Debug, Default)]
pub struct SessionLocks {
    slots: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn holds `id`, then returns the guard.
    pub async fn lock(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            // A count of one means only the map holds it: nobody owns or waits.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(id.clone()).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of sessions currently locked or awaited.
    pub async fn active(&self) -> usize {
        self.slots
            .lock()
            .await
            .values()
            .filter(|slot| Arc::strong_count(slot) > 1)
            .count()
    }
}
