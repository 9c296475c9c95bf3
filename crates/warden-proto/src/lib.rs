//! # warden-proto
//!
//! Plain data records and the bridge wire format used by `guildwarden`.
//!
//! ## Features
//!
//! - Guild entities (channels, roles, permission overwrites) as inert records
//! - Audit log entries and event types
//! - Inbound event / outbound command frames for the JSON-lines bridge
//! - Optional Tokio codec for newline-delimited JSON framing
//!
//! ## Quick Start
//!
//! ```rust
//! use warden_proto::{Inbound, Snowflake};
//!
//! let raw = r#"{"t":"ROLE_DELETE","d":{"id":"42","guild_id":"1","name":"mods","permissions":"8","position":3}}"#;
//! let frame: Inbound = serde_json::from_str(raw).expect("valid frame");
//!
//! if let Inbound::RoleDelete(role) = frame {
//!     assert_eq!(role.id, Snowflake(42));
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod audit;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod entity;
pub mod error;
pub mod frame;
pub mod permissions;
pub mod snowflake;

pub use self::audit::{AuditEntry, AuditEvent};
#[cfg(feature = "tokio")]
pub use self::codec::FrameCodec;
pub use self::entity::{
    Channel, ChannelEdit, ChannelState, Entity, EntityKey, EntityKind, Guild, OverwriteKind,
    PermissionOverwrite, Role, RoleState, Snapshot,
};
pub use self::error::ProtocolError;
pub use self::frame::{Ack, Inbound, Outbound, Ready};
pub use self::permissions::Permissions;
pub use self::snowflake::Snowflake;
