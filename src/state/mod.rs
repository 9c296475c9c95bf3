//! In-memory reconciliation state.
//!
//! Everything here is process-local and lost on restart; the first snapshot
//! taken after boot is the new baseline.
//!
//! - [`SnapshotStore`]: last known-good state per entity
//! - [`DebounceGate`]: per-entity suppression window
//! - [`RestoreGate`]: "revert in flight" flag, held as an RAII token
//! - [`EntityLocks`]: per-entity serialisation of reconciliations

mod dashmap_ext;
mod debounce;
mod locks;
mod restore;
mod snapshot;

pub use dashmap_ext::DashMapExt;
pub use debounce::DebounceGate;
pub use locks::EntityLocks;
pub use restore::{RestoreGate, RestoreToken};
pub use snapshot::SnapshotStore;
