//! Authorization policy.

use std::collections::HashSet;
use warden_proto::{EntityKey, EntityKind, Snowflake};

use crate::config::PolicyConfig;

/// How an attributed change is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The agent's own corrective write.
    SelfCaused,
    /// A whitelisted actor.
    Allowed,
    /// Anyone else.
    Unauthorized,
    /// Nobody could be attributed. Accepted: the audit trail may simply be
    /// slow, and reverting a legitimate change is worse than keeping a bad one.
    Unknown,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfCaused => "self",
            Self::Allowed => "allowed",
            Self::Unauthorized => "unauthorized",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify an attributed actor. Pure.
pub fn classify(
    actor: Option<Snowflake>,
    self_id: Option<Snowflake>,
    allowed: &HashSet<Snowflake>,
) -> Verdict {
    let Some(actor) = actor else {
        return Verdict::Unknown;
    };
    if Some(actor) == self_id {
        Verdict::SelfCaused
    } else if allowed.contains(&actor) {
        Verdict::Allowed
    } else {
        Verdict::Unauthorized
    }
}

/// Whitelist plus exempt entities.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    whitelist: HashSet<Snowflake>,
    ignored_channels: HashSet<Snowflake>,
    ignored_roles: HashSet<Snowflake>,
}

impl Policy {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            whitelist: config.whitelist.clone(),
            ignored_channels: config.ignored_channel_ids.clone(),
            ignored_roles: config.ignored_role_ids.clone(),
        }
    }

    /// Exempt entities are accepted whoever changes them.
    pub fn is_ignored(&self, key: EntityKey) -> bool {
        match key.kind {
            EntityKind::Channel => self.ignored_channels.contains(&key.id),
            EntityKind::Role => self.ignored_roles.contains(&key.id),
        }
    }

    pub fn classify(&self, actor: Option<Snowflake>, self_id: Option<Snowflake>) -> Verdict {
        classify(actor, self_id, &self.whitelist)
    }
}
