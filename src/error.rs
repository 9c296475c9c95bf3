//! Unified error handling for guildwarden.
//!
//! Only genuine failures live here. Expected conditions (missing snapshot,
//! unattributed change) are ordinary values in [`crate::reconcile::Outcome`].

use thiserror::Error;
use warden_proto::EntityKind;

// ============================================================================
// Platform Errors (collaborator calls)
// ============================================================================

/// Errors returned by platform capability calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The call could not be delivered or its answer could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The platform answered and refused the call.
    #[error("rejected by platform: {0}")]
    Rejected(String),

    #[error("timed out waiting for platform")]
    Timeout,

    #[error("platform connection closed")]
    Closed,
}

impl PlatformError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Rejected(_) => "rejected",
            Self::Timeout => "timeout",
            Self::Closed => "closed",
        }
    }
}

// ============================================================================
// Revert Errors (corrective writes)
// ============================================================================

/// A corrective write failed. Identifies which step of the revert broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevertError {
    /// Metadata edit failed; nothing was written.
    #[error("{kind} edit failed: {source}")]
    Edit {
        kind: EntityKind,
        #[source]
        source: PlatformError,
    },

    /// Metadata was restored but the permission overwrite replacement failed.
    #[error("permission overwrite replacement failed: {0}")]
    Overwrites(#[source] PlatformError),

    /// Snapshot and entity disagree on kind.
    #[error("snapshot is a {snapshot}, entity is a {entity}")]
    KindMismatch {
        snapshot: EntityKind,
        entity: EntityKind,
    },
}

impl RevertError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Edit { source, .. } => source.error_code(),
            Self::Overwrites(_) => "overwrites",
            Self::KindMismatch { .. } => "kind_mismatch",
        }
    }
}
