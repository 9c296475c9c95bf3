//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BotConfig, ServerConfig)
//! - [`policy`]: Who may change what (PolicyConfig, RestoreScope)
//! - [`timing`]: Debounce, retry and cool-down knobs (TimingConfig)
//! - [`bridge`]: Gateway bridge transport knobs (BridgeConfig)
//! - [`legacy`]: The flat camelCase `config.json` layout
//! - [`validation`]: Startup checks reporting every problem at once

mod bridge;
mod legacy;
mod policy;
mod timing;
mod types;
pub mod validation;

pub use bridge::BridgeConfig;
pub use policy::{PolicyConfig, RestoreScope};
pub use timing::TimingConfig;
pub use types::{BotConfig, Config, ConfigError, ServerConfig};
