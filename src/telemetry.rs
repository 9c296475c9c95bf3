//! Timing guards and span constructors.

use std::time::Instant;
use warden_proto::EntityKind;

/// Records reconcile latency and outcome when dropped.
///
/// The outcome defaults to `aborted` so a task cancelled mid-decision still
/// shows up; call [`ReconcileTimer::finish`] with the real label.
pub struct ReconcileTimer {
    kind: EntityKind,
    outcome: &'static str,
    start: Instant,
}

impl ReconcileTimer {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            outcome: "aborted",
            start: Instant::now(),
        }
    }

    pub fn finish(&mut self, outcome: &'static str) {
        self.outcome = outcome;
    }
}

impl Drop for ReconcileTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_reconcile(self.kind.as_str(), self.outcome, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};
    use warden_proto::{EntityKind, Snowflake};

    /// Span for handling one entity update.
    pub fn reconcile(kind: EntityKind, id: Snowflake, name: &str) -> Span {
        info_span!("reconcile", kind = %kind, id = %id, name = %name)
    }

    /// Span for the bridge session.
    pub fn bridge() -> Span {
        info_span!("bridge")
    }
}
