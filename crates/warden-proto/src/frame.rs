//! Bridge frames.
//!
//! The agent exchanges newline-delimited JSON with a gateway bridge process.
//! Inbound frames are `{"t": EVENT, "d": payload}`; outbound frames are
//! `{"op": COMMAND, "nonce": n, ...}` and each is answered by an `ACK`
//! carrying the same nonce.

use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::entity::{Channel, ChannelEdit, Guild, PermissionOverwrite, Role, RoleState};
use crate::snowflake::Snowflake;

/// Startup payload: the agent's own identity and every visible guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ready {
    /// The agent's own user id.
    pub user_id: Snowflake,
    /// Guilds visible to the agent.
    #[serde(default)]
    pub guilds: Vec<Guild>,
}

/// Acknowledgement of an outbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Nonce of the command being acknowledged.
    pub nonce: u64,
    /// Failure reason; absent on success.
    #[serde(default)]
    pub error: Option<String>,
}

/// Frames received from the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inbound {
    /// Session established.
    Ready(Ready),
    /// Channel created.
    ChannelCreate(Channel),
    /// Channel changed; payload is the new state.
    ChannelUpdate(Channel),
    /// Channel deleted; payload is the last state.
    ChannelDelete(Channel),
    /// Role created.
    RoleCreate(Role),
    /// Role changed; payload is the new state.
    RoleUpdate(Role),
    /// Role deleted; payload is the last state.
    RoleDelete(Role),
    /// The platform appended an audit log entry.
    AuditLogEntryCreate(AuditEntry),
    /// Result of an outbound command.
    Ack(Ack),
}

impl Inbound {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready(_) => "READY",
            Self::ChannelCreate(_) => "CHANNEL_CREATE",
            Self::ChannelUpdate(_) => "CHANNEL_UPDATE",
            Self::ChannelDelete(_) => "CHANNEL_DELETE",
            Self::RoleCreate(_) => "ROLE_CREATE",
            Self::RoleUpdate(_) => "ROLE_UPDATE",
            Self::RoleDelete(_) => "ROLE_DELETE",
            Self::AuditLogEntryCreate(_) => "AUDIT_LOG_ENTRY_CREATE",
            Self::Ack(_) => "ACK",
        }
    }
}

/// Commands sent to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outbound {
    /// Hand the bot credential to the bridge.
    Identify {
        /// Correlation nonce.
        nonce: u64,
        /// Bot token.
        token: String,
    },
    /// Edit channel metadata.
    EditChannel {
        /// Correlation nonce.
        nonce: u64,
        /// Target channel.
        channel_id: Snowflake,
        /// Desired fields.
        fields: ChannelEdit,
    },
    /// Replace every permission overwrite on a channel.
    SetOverwrites {
        /// Correlation nonce.
        nonce: u64,
        /// Target channel.
        channel_id: Snowflake,
        /// Complete overwrite list.
        overwrites: Vec<PermissionOverwrite>,
    },
    /// Edit a role.
    EditRole {
        /// Correlation nonce.
        nonce: u64,
        /// Target role.
        role_id: Snowflake,
        /// Desired fields.
        fields: RoleState,
    },
    /// Send a direct message.
    SendDm {
        /// Correlation nonce.
        nonce: u64,
        /// Recipient.
        user_id: Snowflake,
        /// Message body.
        content: String,
    },
}

impl Outbound {
    /// Correlation nonce.
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Identify { nonce, .. }
            | Self::EditChannel { nonce, .. }
            | Self::SetOverwrites { nonce, .. }
            | Self::EditRole { nonce, .. }
            | Self::SendDm { nonce, .. } => *nonce,
        }
    }

    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identify { .. } => "IDENTIFY",
            Self::EditChannel { .. } => "EDIT_CHANNEL",
            Self::SetOverwrites { .. } => "SET_OVERWRITES",
            Self::EditRole { .. } => "EDIT_ROLE",
            Self::SendDm { .. } => "SEND_DM",
        }
    }
}
