//! Best-effort decision reports.
//!
//! Every decision is mirrored as a direct message to the configured log user.
//! Delivery can fail for reasons the agent cannot fix (closed DMs, transport
//! down); such failures are logged and counted, never returned.

use std::fmt;
use std::sync::Arc;
use tracing::warn;
use warden_proto::Snowflake;

use crate::platform::DirectMessenger;

/// Longest message the platform accepts, in characters.
pub const MAX_NOTIFICATION_LEN: usize = 2000;

#[derive(Clone, Default)]
pub struct Notifier {
    sink: Option<(Arc<dyn DirectMessenger>, Snowflake)>,
}

impl Notifier {
    /// Reports go to `user`; `None` disables them.
    pub fn new(messenger: Arc<dyn DirectMessenger>, user: Option<Snowflake>) -> Self {
        Self {
            sink: user.map(|user| (messenger, user)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub async fn send(&self, text: &str) {
        let Some((messenger, user)) = &self.sink else {
            return;
        };
        let text = truncate(text, MAX_NOTIFICATION_LEN);
        if let Err(e) = messenger.send_direct_message(*user, text).await {
            crate::metrics::record_notification_dropped();
            warn!(user = %user, error = %e, "Failed to send notification");
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("user", &self.sink.as_ref().map(|(_, user)| *user))
            .finish()
    }
}

/// First `max` characters of `text`.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
