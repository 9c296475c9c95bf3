use warden_proto::Snowflake;

use crate::error::RevertError;
use crate::security::Verdict;

/// Why an update was skipped without attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// A corrective write was in flight; the update is most likely its echo.
    Restoring,
    /// Another update for the same entity was handled within the window.
    Debounced,
}

/// What happened to one update notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Dropped before attribution. The snapshot is untouched.
    Suppressed(SuppressReason),
    /// Entity is exempt. The new state became the baseline.
    Ignored,
    /// The entity was deleted before the decision was applied. Nothing was
    /// saved or written.
    Deleted,
    /// The new state became the baseline.
    Accepted(Verdict),
    /// Unauthorized, but no baseline existed to restore. The new state became
    /// the baseline.
    NoBaseline { actor: Snowflake },
    /// Unauthorized and restored to the baseline.
    Reverted { actor: Snowflake },
    /// Unauthorized and the restore failed. The baseline is kept; the
    /// unauthorized state stays in place on the platform.
    RevertFailed { actor: Snowflake, error: RevertError },
}

impl Outcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Suppressed(SuppressReason::Restoring) => "suppressed_restoring",
            Self::Suppressed(SuppressReason::Debounced) => "suppressed_debounced",
            Self::Ignored => "ignored",
            Self::Deleted => "deleted",
            Self::Accepted(verdict) => match verdict {
                Verdict::SelfCaused => "accepted_self",
                Verdict::Allowed => "accepted_allowed",
                Verdict::Unknown => "accepted_unknown",
                Verdict::Unauthorized => "accepted_unauthorized",
            },
            Self::NoBaseline { .. } => "no_baseline",
            Self::Reverted { .. } => "reverted",
            Self::RevertFailed { .. } => "revert_failed",
        }
    }

    /// True if the platform was written to.
    pub fn wrote(&self) -> bool {
        matches!(self, Self::Reverted { .. } | Self::RevertFailed { .. })
    }
}
