//! Authorization policy configuration.

use serde::Deserialize;
use std::collections::HashSet;
use warden_proto::Snowflake;

/// Which actors may change protected entities, and which entities are exempt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// Actors whose changes persist.
    #[serde(default)]
    pub whitelist: HashSet<Snowflake>,
    /// Channels excluded from protection.
    #[serde(default)]
    pub ignored_channel_ids: HashSet<Snowflake>,
    /// Roles excluded from protection.
    #[serde(default)]
    pub ignored_role_ids: HashSet<Snowflake>,
    /// Reach of the "revert in flight" flag (default: global).
    #[serde(default)]
    pub restore_scope: RestoreScope,
}

/// Reach of the re-entrancy flag raised while a revert is being written.
///
/// `Global` matches one flag for the whole process: while any revert is in
/// flight, every incoming update is skipped. `Kind` keeps one flag per entity
/// kind so a role revert does not mask a concurrent channel change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreScope {
    #[default]
    Global,
    Kind,
}
