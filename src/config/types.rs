//! Core configuration types and loading.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use warden_proto::Snowflake;

use super::bridge::BridgeConfig;
use super::legacy::LegacyConfig;
use super::policy::PolicyConfig;
use super::timing::TimingConfig;
use super::validation::{self, ValidationError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to parse legacy json config: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Agent configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and notification target.
    pub bot: BotConfig,
    /// Authorization policy.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Debounce, retry and cool-down timing.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Gateway bridge transport.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Process-level options (metrics endpoint).
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load and validate configuration.
    ///
    /// Files ending in `.json` are read as the flat camelCase layout; anything
    /// else is TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str::<LegacyConfig>(&content)?.into()
        } else {
            toml::from_str::<Config>(&content)?
        };

        validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Bot identity configuration.
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    /// Credential handed to the gateway bridge.
    pub token: String,
    /// Recipient of decision reports (optional; reports are only logged when unset).
    #[serde(default)]
    pub log_user_id: Option<Snowflake>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("log_user_id", &self.log_user_id)
            .finish()
    }
}

/// Process-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Prometheus metrics HTTP port (0 or unset disables the endpoint).
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn token_is_redacted_in_debug() {
        let bot = BotConfig {
            token: "super-secret".into(),
            log_user_id: None,
        };
        let rendered = format!("{bot:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[bot]
token = "abc"
log_user_id = 42

[policy]
whitelist = ["1", "2"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bot.log_user_id, Some(Snowflake(42)));
        assert!(config.policy.whitelist.contains(&Snowflake(1)));
        assert!(config.policy.whitelist.contains(&Snowflake(2)));
        assert_eq!(config.timing.retry_attempts, 3);
    }

    #[test]
    fn load_legacy_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "botToken": "abc",
                "whitelist": ["100"],
                "rateLimitDelay": 500,
                "logUserId": "7",
                "debounceTime": 1500,
                "retryAttempts": 4,
                "retryDelay": 250,
                "ignoredChannelIds": ["55"]
            }}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bot.token, "abc");
        assert_eq!(config.timing.rate_limit_delay_ms, 500);
        assert_eq!(config.timing.debounce_time_ms, 1500);
        assert_eq!(config.timing.retry_attempts, 4);
        assert_eq!(config.timing.retry_delay_ms, 250);
        assert!(config.policy.ignored_channel_ids.contains(&Snowflake(55)));
        assert!(config.policy.ignored_role_ids.is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/guildwarden.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[bot]
token = ""

[timing]
retry_attempts = 0
"#
        )
        .unwrap();

        match Config::load(file.path()) {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
