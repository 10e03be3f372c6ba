//! Per-client mutual exclusion.
//!
//! Two inbound utterances for the same `client_id` (a typed message and an
//! audio upload, say) must not interleave their history updates. Each client
//! gets its own async mutex; different clients never contend.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct ClientLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ClientLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `client_id`'s conversation.
    pub async fn acquire(&self, client_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(client_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry for `client_id` once nobody holds or waits on it.
    ///
    /// An entry still shared with a queued caller is kept, otherwise the next
    /// `acquire` would hand out a second mutex for the same client.
    pub fn forget(&self, client_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(client_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(client_id);
        }
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
