//! The flat camelCase `config.json` layout.
//!
//! Deployments that predate the TOML file keep working: the JSON document is
//! read as-is and mapped onto [`Config`].

use serde::Deserialize;
use std::collections::HashSet;
use warden_proto::Snowflake;

use super::bridge::BridgeConfig;
use super::policy::{PolicyConfig, RestoreScope};
use super::timing::TimingConfig;
use super::types::{BotConfig, Config, ServerConfig};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LegacyConfig {
    bot_token: String,
    #[serde(default)]
    whitelist: HashSet<Snowflake>,
    rate_limit_delay: Option<u64>,
    #[serde(default)]
    log_user_id: Option<Snowflake>,
    debounce_time: Option<u64>,
    retry_attempts: Option<u32>,
    retry_delay: Option<u64>,
    #[serde(default)]
    ignored_channel_ids: HashSet<Snowflake>,
}

impl From<LegacyConfig> for Config {
    fn from(legacy: LegacyConfig) -> Self {
        let defaults = TimingConfig::default();
        Self {
            bot: BotConfig {
                token: legacy.bot_token,
                log_user_id: legacy.log_user_id,
            },
            policy: PolicyConfig {
                whitelist: legacy.whitelist,
                ignored_channel_ids: legacy.ignored_channel_ids,
                ignored_role_ids: HashSet::new(),
                restore_scope: RestoreScope::Global,
            },
            timing: TimingConfig {
                rate_limit_delay_ms: legacy
                    .rate_limit_delay
                    .unwrap_or(defaults.rate_limit_delay_ms),
                debounce_time_ms: legacy.debounce_time.unwrap_or(defaults.debounce_time_ms),
                retry_attempts: legacy.retry_attempts.unwrap_or(defaults.retry_attempts),
                retry_delay_ms: legacy.retry_delay.unwrap_or(defaults.retry_delay_ms),
            },
            bridge: BridgeConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
