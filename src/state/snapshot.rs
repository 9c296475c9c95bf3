//! Last known-good entity state.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use warden_proto::{ChannelState, Entity, EntityKey, EntityKind, RoleState, Snapshot, Snowflake};

use super::DashMapExt;

/// A deleted entity keeps a tombstone so that a reconciliation still in
/// flight for it cannot bring its snapshot back. Platform ids are never
/// reused, so tombstones are never cleared except by an explicit [`SnapshotStore::save`].
#[derive(Debug, Clone)]
enum Slot {
    Live(Snapshot),
    Deleted,
}

/// Snapshot per (kind, id). Writes overwrite; there is no merge.
///
/// Per-key atomicity comes from the map; callers needing read-modify-write
/// across an await serialise through [`super::EntityLocks`].
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: DashMap<EntityKey, Slot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the snapshot for `id`, clearing any tombstone. Returns `true`
    /// if the stored state changed.
    pub fn save(&self, id: Snowflake, snapshot: Snapshot) -> bool {
        self.store(id, snapshot, true).unwrap_or(true)
    }

    /// Like [`save`](Self::save), but refuses once `id` has been deleted.
    /// Returns `None` for a deleted entity.
    pub fn save_live(&self, id: Snowflake, snapshot: Snapshot) -> Option<bool> {
        self.store(id, snapshot, false)
    }

    fn store(&self, id: Snowflake, snapshot: Snapshot, revive: bool) -> Option<bool> {
        let key = EntityKey::new(snapshot.kind(), id);
        let changed = match self.entries.entry(key) {
            Entry::Occupied(mut current) => match current.get() {
                Slot::Deleted if !revive => {
                    debug!(kind = %key.kind, id = %id, "entity deleted, snapshot not saved");
                    return None;
                }
                Slot::Deleted => {
                    current.insert(Slot::Live(snapshot));
                    true
                }
                Slot::Live(previous) => {
                    let changed = *previous != snapshot;
                    current.insert(Slot::Live(snapshot));
                    changed
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(Slot::Live(snapshot));
                true
            }
        };
        if !changed {
            debug!(kind = %key.kind, id = %id, "snapshot unchanged");
        }
        Some(changed)
    }

    /// Save the entity's current state as its baseline.
    pub fn seed(&self, entity: &Entity) -> bool {
        self.save(entity.id(), entity.snapshot())
    }

    /// Save the entity's current state unless it has been deleted.
    pub fn seed_live(&self, entity: &Entity) -> Option<bool> {
        self.save_live(entity.id(), entity.snapshot())
    }

    pub fn get(&self, kind: EntityKind, id: Snowflake) -> Option<Snapshot> {
        match self.entries.get_cloned(&EntityKey::new(kind, id))? {
            Slot::Live(snapshot) => Some(snapshot),
            Slot::Deleted => None,
        }
    }

    pub fn channel(&self, id: Snowflake) -> Option<ChannelState> {
        match self.get(EntityKind::Channel, id)? {
            Snapshot::Channel(state) => Some(state),
            Snapshot::Role(_) => None,
        }
    }

    pub fn role(&self, id: Snowflake) -> Option<RoleState> {
        match self.get(EntityKind::Role, id)? {
            Snapshot::Role(state) => Some(state),
            Snapshot::Channel(_) => None,
        }
    }

    /// Remove the snapshot and leave a tombstone. Returns the removed state.
    pub fn delete(&self, kind: EntityKind, id: Snowflake) -> Option<Snapshot> {
        match self.entries.insert(EntityKey::new(kind, id), Slot::Deleted)? {
            Slot::Live(snapshot) => Some(snapshot),
            Slot::Deleted => None,
        }
    }

    pub fn is_deleted(&self, kind: EntityKind, id: Snowflake) -> bool {
        matches!(
            self.entries.get(&EntityKey::new(kind, id)).as_deref(),
            Some(Slot::Deleted)
        )
    }

    /// Number of snapshots held for `kind`.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.entries
            .iter()
            .filter(|e| e.key().kind == kind && matches!(e.value(), Slot::Live(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(|e| matches!(e.value(), Slot::Live(_)))
    }
}
