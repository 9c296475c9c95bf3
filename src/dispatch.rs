//! Event dispatch.
//!
//! Routes inbound platform events to the [`Warden`]. Snapshot bookkeeping for
//! ready, create and delete events happens synchronously, before the next
//! event is routed, so a create is always seen before an update that follows
//! it. Updates run as one task each.

use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info};
use warden_proto::{Entity, EntityKind, Inbound, Ready};

use crate::reconcile::{Outcome, Warden};
use crate::telemetry::spans;

#[derive(Clone)]
pub struct Dispatcher {
    warden: Arc<Warden>,
}

impl Dispatcher {
    pub fn new(warden: Arc<Warden>) -> Self {
        Self { warden }
    }

    pub fn warden(&self) -> &Arc<Warden> {
        &self.warden
    }

    /// Route one event. Returns the reconciliation task for update events.
    pub fn dispatch(&self, event: Inbound) -> Option<JoinHandle<Outcome>> {
        match event {
            Inbound::Ready(ready) => {
                self.on_ready(ready);
                None
            }
            Inbound::ChannelCreate(channel) => {
                self.on_create(channel.into());
                None
            }
            Inbound::RoleCreate(role) => {
                self.on_create(role.into());
                None
            }
            Inbound::ChannelDelete(channel) => {
                self.on_delete(channel.into());
                None
            }
            Inbound::RoleDelete(role) => {
                self.on_delete(role.into());
                None
            }
            Inbound::ChannelUpdate(channel) => Some(self.on_update(channel.into())),
            Inbound::RoleUpdate(role) => Some(self.on_update(role.into())),
            other @ (Inbound::AuditLogEntryCreate(_) | Inbound::Ack(_)) => {
                debug!(event = other.name(), "Transport event reached dispatcher, dropping");
                None
            }
        }
    }

    /// Dispatch every event of `events`, then wait for the spawned
    /// reconciliations to finish.
    pub async fn run<S>(&self, events: S) -> Vec<Outcome>
    where
        S: Stream<Item = Inbound>,
    {
        let mut events = std::pin::pin!(events);
        let mut tasks = Vec::new();
        while let Some(event) = events.next().await {
            tasks.extend(self.dispatch(event));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "Reconciliation task failed"),
            }
        }
        outcomes
    }

    fn on_ready(&self, ready: Ready) {
        self.warden.set_self_id(ready.user_id);
        let snapshots = self.warden.snapshots();
        for guild in ready.guilds {
            for channel in guild.channels {
                snapshots.seed(&channel.into());
            }
            for role in guild.roles {
                snapshots.seed(&role.into());
            }
        }
        let channels = snapshots.len(EntityKind::Channel);
        let roles = snapshots.len(EntityKind::Role);
        update_gauges(channels, roles);
        info!(
            agent = %ready.user_id,
            channels,
            roles,
            "Ready, snapshots seeded"
        );
    }

    fn on_create(&self, entity: Entity) {
        let snapshots = self.warden.snapshots();
        snapshots.seed(&entity);
        crate::metrics::set_snapshot_count(entity.kind().as_str(), snapshots.len(entity.kind()));
        self.announce(format!("New {} created: {}", entity.kind(), entity.name()));
    }

    fn on_delete(&self, entity: Entity) {
        let snapshots = self.warden.snapshots();
        snapshots.delete(entity.kind(), entity.id());
        self.warden.locks().forget(entity.key());
        crate::metrics::set_snapshot_count(entity.kind().as_str(), snapshots.len(entity.kind()));
        self.announce(format!("{} deleted: {}", capitalized(entity.kind()), entity.name()));
    }

    fn on_update(&self, entity: Entity) -> JoinHandle<Outcome> {
        let span = spans::reconcile(entity.kind(), entity.id(), entity.name());
        let warden = Arc::clone(&self.warden);
        tokio::spawn(async move { warden.on_update(entity).await }.instrument(span))
    }

    fn announce(&self, message: String) {
        info!("{message}");
        let notifier = self.warden.notifier().clone();
        if notifier.is_enabled() {
            tokio::spawn(async move { notifier.send(&message).await });
        }
    }
}

fn capitalized(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Channel => "Channel",
        EntityKind::Role => "Role",
    }
}

fn update_gauges(channels: usize, roles: usize) {
    crate::metrics::set_snapshot_count(EntityKind::Channel.as_str(), channels);
    crate::metrics::set_snapshot_count(EntityKind::Role.as_str(), roles);
}
