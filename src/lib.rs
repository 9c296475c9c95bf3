//! guildwarden - guardrail agent for guild channels and roles.
//!
//! Watches channel and role changes, attributes each one through the audit
//! log and reverts those made by actors outside the whitelist. The binary
//! drives it over a JSON-lines gateway bridge; tests drive it through
//! [`platform::memory::MemoryPlatform`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod metrics;
pub mod notify;
pub mod platform;
pub mod reconcile;
pub mod security;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use reconcile::{Outcome, Warden};
