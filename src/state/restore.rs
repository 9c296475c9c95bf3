//! Re-entrancy flag for corrective writes.
//!
//! While a revert is being written, the platform echoes the corrective write
//! back as an ordinary update notification. Those echoes must not be
//! attributed and judged again, so updates arriving while the flag is raised
//! are skipped.
//!
//! The flag is a counter of reverts in flight rather than a boolean, so two
//! overlapping reverts cannot lower it for each other. It is only ever raised
//! through a [`RestoreToken`], which lowers it on drop: every exit path of a
//! revert (success, error, panic) clears it.

use std::sync::atomic::{AtomicUsize, Ordering};
use warden_proto::EntityKind;

use crate::config::RestoreScope;

#[derive(Debug)]
pub struct RestoreGate {
    scope: RestoreScope,
    global: AtomicUsize,
    channels: AtomicUsize,
    roles: AtomicUsize,
}

impl RestoreGate {
    pub fn new(scope: RestoreScope) -> Self {
        Self {
            scope,
            global: AtomicUsize::new(0),
            channels: AtomicUsize::new(0),
            roles: AtomicUsize::new(0),
        }
    }

    fn counter(&self, kind: EntityKind) -> &AtomicUsize {
        match (self.scope, kind) {
            (RestoreScope::Global, _) => &self.global,
            (RestoreScope::Kind, EntityKind::Channel) => &self.channels,
            (RestoreScope::Kind, EntityKind::Role) => &self.roles,
        }
    }

    /// True while a revert that covers `kind` is in flight.
    pub fn is_restoring(&self, kind: EntityKind) -> bool {
        self.counter(kind).load(Ordering::Acquire) > 0
    }

    /// Raise the flag for the lifetime of the returned token.
    #[must_use = "the flag is lowered as soon as the token is dropped"]
    pub fn begin(&self, kind: EntityKind) -> RestoreToken<'_> {
        let counter = self.counter(kind);
        counter.fetch_add(1, Ordering::AcqRel);
        RestoreToken { counter }
    }
}

/// Proof that a revert is in flight. Lowers the flag on drop.
#[derive(Debug)]
pub struct RestoreToken<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for RestoreToken<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
