//! Platform abstraction.
//!
//! The agent never talks to the platform directly. It consumes three narrow
//! capabilities, each its own trait so that components only see what they use:
//!
//! - [`AuditSource`]: read recent audit log entries
//! - [`EntityWriter`]: write channel/role fields back
//! - [`DirectMessenger`]: deliver a report to a user
//!
//! [`bridge::Bridge`] implements them over the JSON-lines gateway bridge;
//! [`memory::MemoryPlatform`] implements them in-process.

use async_trait::async_trait;
use warden_proto::{AuditEntry, AuditEvent, ChannelEdit, PermissionOverwrite, RoleState, Snowflake};

pub use crate::error::PlatformError;

pub mod bridge;
pub mod memory;

#[async_trait]
pub trait AuditSource: Send + Sync {
    /// Most recent entries of `event` in `guild`, newest first, at most `limit`.
    async fn fetch_audit_log(
        &self,
        guild: Snowflake,
        event: AuditEvent,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, PlatformError>;
}

#[async_trait]
pub trait EntityWriter: Send + Sync {
    /// Edit channel metadata. Permission overwrites are not touched.
    async fn edit_channel(&self, channel: Snowflake, fields: &ChannelEdit)
    -> Result<(), PlatformError>;

    /// Replace every permission overwrite on a channel with `overwrites`.
    async fn replace_overwrites(
        &self,
        channel: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> Result<(), PlatformError>;

    /// Edit a role.
    async fn edit_role(&self, role: Snowflake, fields: &RoleState) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait DirectMessenger: Send + Sync {
    /// Send `text` to `user` as a direct message.
    async fn send_direct_message(&self, user: Snowflake, text: &str) -> Result<(), PlatformError>;
}

/// Everything the agent needs from the platform.
pub trait Platform: AuditSource + EntityWriter + DirectMessenger {}

impl<T: AuditSource + EntityWriter + DirectMessenger> Platform for T {}
