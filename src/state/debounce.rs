//! Per-entity debounce gate.
//!
//! One user action can produce several update notifications in quick
//! succession. Only the first one inside the window is reconciled.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;
use tokio::time::Instant;
use warden_proto::EntityKey;

/// Check-and-set gate keyed by (kind, id).
#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    last_seen: DashMap<EntityKey, Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: DashMap::new(),
        }
    }

    /// Returns `true` if `key` was let through less than one window ago.
    ///
    /// When it returns `false` the current instant is recorded, atomically
    /// with the check. Suppressed calls leave the record untouched, so a
    /// steady stream of updates is let through once per window.
    pub fn should_suppress(&self, key: EntityKey) -> bool {
        let now = Instant::now();
        match self.last_seen.entry(key) {
            Entry::Occupied(mut last) => {
                if now.saturating_duration_since(*last.get()) < self.window {
                    true
                } else {
                    last.insert(now);
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_proto::{EntityKind, Snowflake};

    fn key(id: u64) -> EntityKey {
        EntityKey::new(EntityKind::Channel, Snowflake(id))
    }

    #[tokio::test(start_paused = true)]
    async fn suppresses_inside_window_only() {
        let gate = DebounceGate::new(Duration::from_millis(500));
        assert!(!gate.should_suppress(key(1)));
        assert!(gate.should_suppress(key(1)));

        tokio::time::advance(Duration::from_millis(499)).await;
        assert!(gate.should_suppress(key(1)));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!gate.should_suppress(key(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn suppressed_calls_do_not_extend_window() {
        let gate = DebounceGate::new(Duration::from_millis(100));
        assert!(!gate.should_suppress(key(1)));
        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(gate.should_suppress(key(1)));
        tokio::time::advance(Duration::from_millis(40)).await;
        assert!(!gate.should_suppress(key(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let gate = DebounceGate::new(Duration::from_secs(1));
        assert!(!gate.should_suppress(key(1)));
        assert!(!gate.should_suppress(key(2)));
        assert!(!gate.should_suppress(EntityKey::new(EntityKind::Role, Snowflake(1))));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_window_never_suppresses() {
        let gate = DebounceGate::new(Duration::ZERO);
        assert!(!gate.should_suppress(key(1)));
        assert!(!gate.should_suppress(key(1)));
    }
}
