//! Reconciliation engine.
//!
//! [`Warden`] owns all reconciliation state and decides, per update
//! notification, whether the new state is kept or reverted:
//!
//! ```text
//! restoring? -> debounced? -> [entity lock] -> deleted? -> ignored? -> attribute -> classify
//!                                                                          |
//!               SelfCaused / Allowed / Unknown: keep new state as baseline
//!               Unauthorized: write baseline back, hold restore token for cool-down
//! ```
//!
//! A delete notification can land while an update for the same entity is
//! being attributed. The snapshot store keeps a tombstone for deleted
//! entities; the decision is checked against it and never saves over it.
//!
//! Every decision is logged, reported through the [`Notifier`] and returned
//! as an [`Outcome`].

mod outcome;
mod revert;

pub use outcome::{Outcome, SuppressReason};

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use warden_proto::{AuditEvent, Entity, Snowflake};

use crate::config::Config;
use crate::notify::Notifier;
use crate::platform::{EntityWriter, Platform};
use crate::security::{AttributionResolver, Policy, RetryPolicy, Verdict};
use crate::state::{DebounceGate, EntityLocks, RestoreGate, SnapshotStore};
use crate::telemetry::ReconcileTimer;

pub struct Warden {
    snapshots: SnapshotStore,
    debounce: DebounceGate,
    restore: RestoreGate,
    locks: EntityLocks,
    attribution: AttributionResolver,
    policy: Policy,
    self_id: RwLock<Option<Snowflake>>,
    writer: Arc<dyn EntityWriter>,
    notifier: Notifier,
    rate_limit_delay: Duration,
}

impl Warden {
    pub fn new<P: Platform + 'static>(platform: Arc<P>, config: &Config) -> Self {
        let retry = RetryPolicy::new(config.timing.retry_attempts, config.timing.retry_delay());
        Self {
            snapshots: SnapshotStore::new(),
            debounce: DebounceGate::new(config.timing.debounce_window()),
            restore: RestoreGate::new(config.policy.restore_scope),
            locks: EntityLocks::new(),
            attribution: AttributionResolver::new(platform.clone(), retry),
            policy: Policy::new(&config.policy),
            self_id: RwLock::new(None),
            writer: platform.clone(),
            notifier: Notifier::new(platform, config.bot.log_user_id),
            rate_limit_delay: config.timing.rate_limit_delay(),
        }
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn locks(&self) -> &EntityLocks {
        &self.locks
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn restore_gate(&self) -> &RestoreGate {
        &self.restore
    }

    /// The agent's own actor id, once known.
    pub fn self_id(&self) -> Option<Snowflake> {
        *self.self_id.read()
    }

    pub fn set_self_id(&self, id: Snowflake) {
        *self.self_id.write() = Some(id);
    }

    /// Handle one update notification carrying the entity's new state.
    pub async fn on_update(&self, entity: Entity) -> Outcome {
        let mut timer = ReconcileTimer::new(entity.kind());
        let outcome = self.reconcile(&entity).await;
        timer.finish(outcome.label());
        outcome
    }

    async fn reconcile(&self, entity: &Entity) -> Outcome {
        let kind = entity.kind();
        let key = entity.key();
        let name = entity.name();

        let restoring = self.restore.is_restoring(kind);
        let debounced = !restoring && self.debounce.should_suppress(key);
        if restoring || debounced {
            self.report(format!(
                "Skipped {kind} update for: {name} (restoring: {restoring}, debounced: {debounced})"
            ))
            .await;
            return Outcome::Suppressed(if restoring {
                SuppressReason::Restoring
            } else {
                SuppressReason::Debounced
            });
        }

        let guard = self.locks.lock(key).await;
        let outcome = self.decide(entity).await;
        drop(guard);
        if matches!(outcome, Outcome::Deleted) {
            self.locks.forget(key);
        }
        outcome
    }

    /// Everything after the entity lock is taken.
    async fn decide(&self, entity: &Entity) -> Outcome {
        let kind = entity.kind();
        let key = entity.key();
        let name = entity.name();

        if self.snapshots.is_deleted(kind, entity.id()) {
            return self.dropped(entity).await;
        }

        if self.policy.is_ignored(key) {
            if self.snapshots.seed_live(entity).is_none() {
                return self.dropped(entity).await;
            }
            self.report(format!("Ignored {kind} update for: {name} (in ignored list)"))
                .await;
            return Outcome::Ignored;
        }

        let actor = self
            .attribution
            .resolve(entity.guild_id(), entity.id(), AuditEvent::update_of(kind))
            .await;
        let self_id = self.self_id();

        match (self.policy.classify(actor, self_id), actor) {
            (Verdict::Unauthorized, Some(actor)) => self.revert(entity, actor).await,
            (Verdict::SelfCaused, _) => {
                let own = self_id.map(|id| id.to_string()).unwrap_or_default();
                self.accept(
                    entity,
                    Verdict::SelfCaused,
                    format!("Ignoring self-triggered {kind} update for: {name} (agent id: {own})"),
                )
                .await
            }
            (Verdict::Allowed, Some(actor)) => {
                self.accept(
                    entity,
                    Verdict::Allowed,
                    format!("Whitelisted user {actor} updated {kind} {name}. Saving new state..."),
                )
                .await
            }
            _ => {
                self.accept(
                    entity,
                    Verdict::Unknown,
                    format!("No audit log entry found for {kind} update: {name}"),
                )
                .await
            }
        }
    }

    async fn accept(&self, entity: &Entity, verdict: Verdict, message: String) -> Outcome {
        if self.snapshots.seed_live(entity).is_none() {
            return self.dropped(entity).await;
        }
        self.report(message).await;
        Outcome::Accepted(verdict)
    }

    async fn revert(&self, entity: &Entity, actor: Snowflake) -> Outcome {
        let kind = entity.kind();
        let name = entity.name();
        if self.snapshots.is_deleted(kind, entity.id()) {
            return self.dropped(entity).await;
        }
        self.alert(format!(
            "Non-whitelisted user {actor} updated {kind} {name}. Reverting..."
        ))
        .await;

        let Some(snapshot) = self.snapshots.get(kind, entity.id()) else {
            if self.snapshots.seed_live(entity).is_none() {
                return self.dropped(entity).await;
            }
            self.alert(format!("No previous state found for {kind}: {name}"))
                .await;
            return Outcome::NoBaseline { actor };
        };

        let token = self.restore.begin(kind);
        match revert::restore(self.writer.as_ref(), entity, &snapshot).await {
            Ok(()) => {
                let restored = snapshot.name().to_owned();
                self.snapshots.save_live(entity.id(), snapshot);
                self.report(format!("Restored {kind}: {restored}")).await;
                tokio::time::sleep(self.rate_limit_delay).await;
                drop(token);
                Outcome::Reverted { actor }
            }
            Err(error) => {
                drop(token);
                crate::metrics::record_revert_failure(kind.as_str(), error.error_code());
                self.alert(format!("Failed to restore {kind} {name}: {error}"))
                    .await;
                Outcome::RevertFailed { actor, error }
            }
        }
    }

    async fn dropped(&self, entity: &Entity) -> Outcome {
        self.report(format!(
            "Dropped {} update for: {} (entity deleted)",
            entity.kind(),
            entity.name()
        ))
        .await;
        Outcome::Deleted
    }

    async fn report(&self, message: String) {
        info!("{message}");
        self.notifier.send(&message).await;
    }

    async fn alert(&self, message: String) {
        warn!("{message}");
        self.notifier.send(&message).await;
    }
}
