//! In-process platform.
//!
//! Holds guild entities and an audit log in memory and applies writes the way
//! the real platform would: a write changes the stored entity, appends an
//! audit entry naming the agent as executor and, when an echo channel is
//! attached, emits the resulting update notification. Failures can be
//! injected per capability.
//!
//! Used by the test suite and for local dry runs of a policy.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use warden_proto::{
    AuditEntry, AuditEvent, Channel, ChannelEdit, Guild, Inbound, PermissionOverwrite, Ready,
    Role, RoleState, Snowflake,
};

use super::{AuditSource, DirectMessenger, EntityWriter, PlatformError};

/// A write the platform accepted, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    EditChannel(Snowflake, ChannelEdit),
    ReplaceOverwrites(Snowflake, Vec<PermissionOverwrite>),
    EditRole(Snowflake, RoleState),
}

#[derive(Debug)]
pub struct MemoryPlatform {
    guild_id: Snowflake,
    agent_id: Snowflake,
    channels: DashMap<Snowflake, Channel>,
    roles: DashMap<Snowflake, Role>,
    /// Newest first.
    audit: Mutex<VecDeque<AuditEntry>>,
    writes: Mutex<Vec<Write>>,
    messages: Mutex<Vec<(Snowflake, String)>>,
    echo: Mutex<Option<mpsc::UnboundedSender<Inbound>>>,
    next_entry_id: AtomicU64,
    audit_fetches: AtomicUsize,
    failing_fetches: AtomicUsize,
    fail_writes: Mutex<Option<String>>,
    fail_overwrites: Mutex<Option<String>>,
    fail_messages: AtomicBool,
}

impl MemoryPlatform {
    pub fn new(guild_id: Snowflake, agent_id: Snowflake) -> Self {
        Self {
            guild_id,
            agent_id,
            channels: DashMap::new(),
            roles: DashMap::new(),
            audit: Mutex::new(VecDeque::new()),
            writes: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            echo: Mutex::new(None),
            next_entry_id: AtomicU64::new(1),
            audit_fetches: AtomicUsize::new(0),
            failing_fetches: AtomicUsize::new(0),
            fail_writes: Mutex::new(None),
            fail_overwrites: Mutex::new(None),
            fail_messages: AtomicBool::new(false),
        }
    }

    /// Emit an update notification for every applied write.
    pub fn attach_echo(&self, tx: mpsc::UnboundedSender<Inbound>) {
        *self.echo.lock() = Some(tx);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    pub fn insert_role(&self, role: Role) {
        self.roles.insert(role.id, role);
    }

    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.channels.get(&id).map(|c| c.clone())
    }

    pub fn role(&self, id: Snowflake) -> Option<Role> {
        self.roles.get(&id).map(|r| r.clone())
    }

    /// The READY payload for the current contents.
    pub fn ready(&self) -> Ready {
        let mut channels: Vec<Channel> = self.channels.iter().map(|c| c.clone()).collect();
        let mut roles: Vec<Role> = self.roles.iter().map(|r| r.clone()).collect();
        channels.sort_by_key(|c| c.id);
        roles.sort_by_key(|r| r.id);
        Ready {
            user_id: self.agent_id,
            guilds: vec![Guild {
                id: self.guild_id,
                channels,
                roles,
            }],
        }
    }

    /// Record an action in the audit log as if `executor` performed it.
    pub fn log_action(
        &self,
        executor: Snowflake,
        event: AuditEvent,
        target: Option<Snowflake>,
    ) -> AuditEntry {
        let entry = AuditEntry {
            id: Snowflake(self.next_entry_id.fetch_add(1, Ordering::Relaxed)),
            guild_id: self.guild_id,
            executor_id: executor,
            target_id: target,
            action_type: event,
            created_at: Utc::now(),
        };
        self.audit.lock().push_front(entry.clone());
        entry
    }

    /// Apply a change made by `actor` directly on the platform: store it and
    /// log it. The update notification is returned rather than sent.
    pub fn apply_channel_change(&self, actor: Snowflake, channel: Channel) -> Inbound {
        self.log_action(actor, AuditEvent::ChannelUpdate, Some(channel.id));
        self.channels.insert(channel.id, channel.clone());
        Inbound::ChannelUpdate(channel)
    }

    /// Role counterpart of [`Self::apply_channel_change`].
    pub fn apply_role_change(&self, actor: Snowflake, role: Role) -> Inbound {
        self.log_action(actor, AuditEvent::RoleUpdate, Some(role.id));
        self.roles.insert(role.id, role.clone());
        Inbound::RoleUpdate(role)
    }

    /// Make the next `count` audit fetches fail with a transport error.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    /// Reject every entity edit with `reason` (`None` to stop).
    pub fn fail_writes(&self, reason: Option<&str>) {
        *self.fail_writes.lock() = reason.map(str::to_owned);
    }

    /// Reject only permission overwrite replacement with `reason`.
    pub fn fail_overwrites(&self, reason: Option<&str>) {
        *self.fail_overwrites.lock() = reason.map(str::to_owned);
    }

    pub fn fail_messages(&self, fail: bool) {
        self.fail_messages.store(fail, Ordering::SeqCst);
    }

    pub fn audit_fetches(&self) -> usize {
        self.audit_fetches.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().clone()
    }

    pub fn messages(&self) -> Vec<(Snowflake, String)> {
        self.messages.lock().clone()
    }

    fn check_writable(&self) -> Result<(), PlatformError> {
        match self.fail_writes.lock().as_deref() {
            Some(reason) => Err(PlatformError::Rejected(reason.to_owned())),
            None => Ok(()),
        }
    }

    fn echo(&self, event: Inbound) {
        if let Some(tx) = self.echo.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    fn update_channel<F>(&self, id: Snowflake, apply: F) -> Result<(), PlatformError>
    where
        F: FnOnce(&mut Channel),
    {
        let updated = {
            let mut channel = self
                .channels
                .get_mut(&id)
                .ok_or_else(|| PlatformError::Rejected("Unknown Channel".into()))?;
            apply(channel.value_mut());
            channel.clone()
        };
        self.log_action(self.agent_id, AuditEvent::ChannelUpdate, Some(id));
        self.echo(Inbound::ChannelUpdate(updated));
        Ok(())
    }
}

#[async_trait]
impl AuditSource for MemoryPlatform {
    async fn fetch_audit_log(
        &self,
        guild: Snowflake,
        event: AuditEvent,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, PlatformError> {
        self.audit_fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PlatformError::Transport("audit log unavailable".into()));
        }

        Ok(self
            .audit
            .lock()
            .iter()
            .filter(|e| e.guild_id == guild && e.action_type == event)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EntityWriter for MemoryPlatform {
    async fn edit_channel(
        &self,
        channel: Snowflake,
        fields: &ChannelEdit,
    ) -> Result<(), PlatformError> {
        self.check_writable()?;
        self.update_channel(channel, |c| {
            c.state.name = fields.name.clone();
            c.state.position = fields.position;
            c.state.parent_id = fields.parent_id;
            c.state.topic = fields.topic.clone();
            c.state.bitrate = fields.bitrate;
            c.state.user_limit = fields.user_limit;
            c.state.nsfw = fields.nsfw;
        })?;
        self.writes
            .lock()
            .push(Write::EditChannel(channel, fields.clone()));
        Ok(())
    }

    async fn replace_overwrites(
        &self,
        channel: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> Result<(), PlatformError> {
        self.check_writable()?;
        if let Some(reason) = self.fail_overwrites.lock().as_deref() {
            return Err(PlatformError::Rejected(reason.to_owned()));
        }
        self.update_channel(channel, |c| {
            c.state.permission_overwrites = overwrites.to_vec();
        })?;
        self.writes
            .lock()
            .push(Write::ReplaceOverwrites(channel, overwrites.to_vec()));
        Ok(())
    }

    async fn edit_role(&self, role: Snowflake, fields: &RoleState) -> Result<(), PlatformError> {
        self.check_writable()?;
        let updated = {
            let mut stored = self
                .roles
                .get_mut(&role)
                .ok_or_else(|| PlatformError::Rejected("Unknown Role".into()))?;
            stored.state = fields.clone();
            stored.clone()
        };
        self.log_action(self.agent_id, AuditEvent::RoleUpdate, Some(role));
        self.writes.lock().push(Write::EditRole(role, fields.clone()));
        self.echo(Inbound::RoleUpdate(updated));
        Ok(())
    }
}

#[async_trait]
impl DirectMessenger for MemoryPlatform {
    async fn send_direct_message(&self, user: Snowflake, text: &str) -> Result<(), PlatformError> {
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(PlatformError::Rejected("Cannot send messages to this user".into()));
        }
        self.messages.lock().push((user, text.to_owned()));
        Ok(())
    }
}
