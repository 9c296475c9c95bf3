//! Timing configuration for debounce, attribution retries and revert cool-down.

use serde::Deserialize;
use std::time::Duration;

/// Timing knobs, all in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Cool-down held after a successful revert before updates are processed again (default: 1000).
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_ms: u64,
    /// Window in which repeated updates for one entity are suppressed (default: 2000).
    #[serde(default = "default_debounce_time")]
    pub debounce_time_ms: u64,
    /// Audit log lookups per attribution (default: 3).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Pause between audit log lookups (default: 1000).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl TimingConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_time_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: default_rate_limit_delay(),
            debounce_time_ms: default_debounce_time(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_rate_limit_delay() -> u64 {
    1000
}

fn default_debounce_time() -> u64 {
    2000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}
