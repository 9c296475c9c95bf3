//! Per-entity serialisation.
//!
//! The debounce window keeps most bursts apart, but two updates for the same
//! entity can still both pass it (the second arriving just after the window)
//! while the first is waiting on the audit log. A per-key async mutex makes
//! the second reconciliation wait for the first, so they never race on the
//! same snapshot.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use warden_proto::EntityKey;

use super::DashMapExt;

#[derive(Debug, Default)]
pub struct EntityLocks {
    locks: DashMap<EntityKey, Arc<Mutex<()>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: EntityKey) -> OwnedMutexGuard<()> {
        // Clone the Arc out first: the shard guard must not live across the await.
        let mutex = self.locks.get_or_default_cloned(key);
        mutex.lock_owned().await
    }

    /// Drop the lock slot for a deleted entity once nobody holds or waits on
    /// it. A busy slot is kept so later callers still queue behind the holder.
    pub fn forget(&self, key: EntityKey) -> bool {
        self.locks
            .remove_if(&key, |_, mutex| Arc::strong_count(mutex) == 1)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
