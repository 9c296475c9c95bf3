//! Change attribution.
//!
//! Update notifications do not say who made the change. The audit log does,
//! but it is written asynchronously and may not show the entry yet when the
//! notification arrives. The resolver therefore polls a few times.
//!
//! Each poll reads the newest [`AUDIT_FETCH_LIMIT`] entries of the matching
//! event type and prefers the one targeting the entity. If none does, the
//! newest entry overall stands in: the platform sometimes logs the change
//! under a related target, and a recent actor is the best available guess.

use std::sync::Arc;
use tracing::{debug, info};
use warden_proto::{AuditEntry, AuditEvent, Snowflake};

use super::retry::RetryPolicy;
use crate::platform::AuditSource;

/// Entries read per poll.
pub const AUDIT_FETCH_LIMIT: usize = 5;

pub struct AttributionResolver {
    source: Arc<dyn AuditSource>,
    retry: RetryPolicy,
}

impl AttributionResolver {
    pub fn new(source: Arc<dyn AuditSource>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Actor behind the latest `event` on `target`, or `None` once retries run out.
    pub async fn resolve(
        &self,
        guild: Snowflake,
        target: Snowflake,
        event: AuditEvent,
    ) -> Option<Snowflake> {
        let actor = self
            .retry
            .run("audit log lookup", |attempt| async move {
                let entries = self
                    .source
                    .fetch_audit_log(guild, event, AUDIT_FETCH_LIMIT)
                    .await
                    .inspect_err(|_| crate::metrics::record_audit_fetch_failure())?;
                let found = pick_entry(&entries, target).map(|entry| {
                    debug!(
                        attempt,
                        entry = %entry.id,
                        executor = %entry.executor_id,
                        exact = entry.target_id == Some(target),
                        "Audit entry matched"
                    );
                    entry.executor_id
                });
                Ok::<_, crate::error::PlatformError>(found)
            })
            .await;

        if actor.is_none() {
            info!(target_id = %target, ?event, attempts = self.retry.attempts, "No audit entry found");
        }
        actor
    }
}

/// The entry targeting `target`, else the newest entry.
fn pick_entry(entries: &[AuditEntry], target: Snowflake) -> Option<&AuditEntry> {
    entries
        .iter()
        .find(|e| e.target_id == Some(target))
        .or_else(|| entries.first())
}
