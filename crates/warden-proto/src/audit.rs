//! Audit log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::snowflake::Snowflake;

/// Audit log action types relevant to structural entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    /// Channel created.
    ChannelCreate,
    /// Channel metadata updated.
    ChannelUpdate,
    /// Channel deleted.
    ChannelDelete,
    /// Channel overwrite created.
    ChannelOverwriteCreate,
    /// Channel overwrite updated.
    ChannelOverwriteUpdate,
    /// Channel overwrite deleted.
    ChannelOverwriteDelete,
    /// Role created.
    RoleCreate,
    /// Role updated.
    RoleUpdate,
    /// Role deleted.
    RoleDelete,
}

impl AuditEvent {
    /// The event type logged for an update of `kind`.
    pub fn update_of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Channel => Self::ChannelUpdate,
            EntityKind::Role => Self::RoleUpdate,
        }
    }
}

/// One audit log entry. Read-only from the agent's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id.
    pub id: Snowflake,
    /// Guild the entry belongs to.
    pub guild_id: Snowflake,
    /// Actor who performed the action.
    #[serde(rename = "user_id")]
    pub executor_id: Snowflake,
    /// Entity the action targeted, if any.
    #[serde(default)]
    pub target_id: Option<Snowflake>,
    /// Action type.
    pub action_type: AuditEvent,
    /// When the platform recorded the action.
    pub created_at: DateTime<Utc>,
}
