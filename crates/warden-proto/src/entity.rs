//! Guild entities as plain data records.
//!
//! These types carry state only. Writing state back to the platform is a
//! capability of the platform adapter, not of the record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::permissions::Permissions;
use crate::snowflake::Snowflake;

/// The kinds of structural entity under protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A text, voice or category channel.
    Channel,
    /// A role definition.
    Role,
}

impl EntityKind {
    /// Lowercase label used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map key for per-entity state: ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity id.
    pub id: Snowflake,
}

impl EntityKey {
    /// Build a key.
    pub fn new(kind: EntityKind, id: Snowflake) -> Self {
        Self { kind, id }
    }
}

/// Who a permission overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteKind {
    /// Applies to every member holding the role.
    Role,
    /// Applies to a single member.
    Member,
}

/// A channel-level permission overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Role or member id.
    pub id: Snowflake,
    /// Subject type.
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    /// Explicitly granted permissions.
    pub allow: Permissions,
    /// Explicitly denied permissions.
    pub deny: Permissions,
}

/// Protected channel fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Channel name.
    pub name: String,
    /// Permission overwrites in platform order.
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
    /// Sort position.
    pub position: i32,
    /// Parent category.
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    /// Channel topic.
    #[serde(default)]
    pub topic: Option<String>,
    /// Voice bitrate.
    #[serde(default)]
    pub bitrate: Option<u32>,
    /// Voice user limit.
    #[serde(default)]
    pub user_limit: Option<u32>,
    /// Age-restricted flag.
    #[serde(default)]
    pub nsfw: bool,
}

/// Channel fields written by a metadata edit. Overwrites travel separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEdit {
    /// Channel name.
    pub name: String,
    /// Sort position.
    pub position: i32,
    /// Parent category.
    pub parent_id: Option<Snowflake>,
    /// Channel topic.
    pub topic: Option<String>,
    /// Voice bitrate.
    pub bitrate: Option<u32>,
    /// Voice user limit.
    pub user_limit: Option<u32>,
    /// Age-restricted flag.
    pub nsfw: bool,
}

impl From<&ChannelState> for ChannelEdit {
    fn from(state: &ChannelState) -> Self {
        Self {
            name: state.name.clone(),
            position: state.position,
            parent_id: state.parent_id,
            topic: state.topic.clone(),
            bitrate: state.bitrate,
            user_limit: state.user_limit,
            nsfw: state.nsfw,
        }
    }
}

/// Protected role fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    /// Role name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Permissions,
    /// RGB color value.
    #[serde(default)]
    pub color: u32,
    /// Displayed separately in the member list.
    #[serde(default)]
    pub hoist: bool,
    /// Mentionable by everyone.
    #[serde(default)]
    pub mentionable: bool,
    /// Sort position.
    pub position: i32,
}

/// A channel as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id.
    pub id: Snowflake,
    /// Owning guild.
    pub guild_id: Snowflake,
    /// Current state.
    #[serde(flatten)]
    pub state: ChannelState,
}

/// A role as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id.
    pub id: Snowflake,
    /// Owning guild.
    pub guild_id: Snowflake,
    /// Current state.
    #[serde(flatten)]
    pub state: RoleState,
}

/// All entities visible in one guild at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    /// Guild id.
    pub id: Snowflake,
    /// Visible channels.
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// Role definitions.
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Last known-good state of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// Channel snapshot.
    Channel(ChannelState),
    /// Role snapshot.
    Role(RoleState),
}

impl Snapshot {
    /// Kind of the snapshotted entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Channel(_) => EntityKind::Channel,
            Self::Role(_) => EntityKind::Role,
        }
    }

    /// Name recorded in the snapshot.
    pub fn name(&self) -> &str {
        match self {
            Self::Channel(c) => &c.name,
            Self::Role(r) => &r.name,
        }
    }
}

/// Either kind of entity, as carried by a change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// A channel.
    Channel(Channel),
    /// A role.
    Role(Role),
}

impl Entity {
    /// Entity kind.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Channel(_) => EntityKind::Channel,
            Self::Role(_) => EntityKind::Role,
        }
    }

    /// Entity id.
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Channel(c) => c.id,
            Self::Role(r) => r.id,
        }
    }

    /// Map key for this entity.
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind(), self.id())
    }

    /// Owning guild.
    pub fn guild_id(&self) -> Snowflake {
        match self {
            Self::Channel(c) => c.guild_id,
            Self::Role(r) => r.guild_id,
        }
    }

    /// Current name.
    pub fn name(&self) -> &str {
        match self {
            Self::Channel(c) => &c.state.name,
            Self::Role(r) => &r.state.name,
        }
    }

    /// Current state as a snapshot value.
    pub fn snapshot(&self) -> Snapshot {
        match self {
            Self::Channel(c) => Snapshot::Channel(c.state.clone()),
            Self::Role(r) => Snapshot::Role(r.state.clone()),
        }
    }
}

impl From<Channel> for Entity {
    fn from(channel: Channel) -> Self {
        Self::Channel(channel)
    }
}

impl From<Role> for Entity {
    fn from(role: Role) -> Self {
        Self::Role(role)
    }
}
