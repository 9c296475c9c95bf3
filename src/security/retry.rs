//! Bounded retries for lookups against eventually-consistent sources.
//!
//! An attempt either produces a value, finds nothing yet, or fails. The last
//! two are treated alike: wait `delay` and try again, up to `attempts` times.
//! Waiting goes through `tokio::time`, so tests drive it with a paused clock.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Run `attempt` until it yields `Some`, at most `self.attempts` times.
    ///
    /// `attempt` receives the 1-based attempt number. There is no pause after
    /// the final attempt. Returns `None` when every attempt came up empty or
    /// failed; failures are logged, never propagated.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut attempt: F) -> Option<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        E: Display,
    {
        for n in 1..=self.attempts {
            match attempt(n).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => debug!(what, attempt = n, "Nothing found yet"),
                Err(e) => warn!(what, attempt = n, error = %e, "Attempt failed"),
            }
            if n < self.attempts {
                tokio::time::sleep(self.delay).await;
            }
        }
        None
    }
}
