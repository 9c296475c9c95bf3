//! Gateway bridge transport configuration.

use serde::Deserialize;
use std::time::Duration;

/// Bridge transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// How long an outbound command waits for its ACK (default: 10000).
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
    /// Audit entries retained for attribution lookups (default: 100).
    #[serde(default = "default_audit_buffer")]
    pub audit_buffer: usize,
    /// Outbound command queue capacity (default: 256).
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

impl BridgeConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout(),
            audit_buffer: default_audit_buffer(),
            outbound_capacity: default_outbound_capacity(),
        }
    }
}

fn default_write_timeout() -> u64 {
    10_000
}

fn default_audit_buffer() -> usize {
    100
}

fn default_outbound_capacity() -> usize {
    256
}
