//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.token is required")]
    MissingToken,
    #[error("timing.retry_attempts must be at least 1")]
    NoRetryAttempts,
    #[error("bridge.audit_buffer must be at least {min}, got {got}")]
    AuditBufferTooSmall { min: usize, got: usize },
    #[error("bridge.outbound_capacity must be at least 1")]
    NoOutboundCapacity,
    #[error("bridge.write_timeout_ms must be non-zero")]
    ZeroWriteTimeout,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.token.trim().is_empty() {
        errors.push(ValidationError::MissingToken);
    }

    if config.timing.retry_attempts == 0 {
        errors.push(ValidationError::NoRetryAttempts);
    }

    // A lookup reads the five most recent entries; a smaller buffer would hide some.
    let min = crate::security::attribution::AUDIT_FETCH_LIMIT;
    if config.bridge.audit_buffer < min {
        errors.push(ValidationError::AuditBufferTooSmall {
            min,
            got: config.bridge.audit_buffer,
        });
    }
    if config.bridge.outbound_capacity == 0 {
        errors.push(ValidationError::NoOutboundCapacity);
    }
    if config.bridge.write_timeout_ms == 0 {
        errors.push(ValidationError::ZeroWriteTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
