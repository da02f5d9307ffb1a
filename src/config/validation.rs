//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first one.

use thiserror::Error;

use crate::config::schema::Config;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a loaded config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("admin.bind_addr {0:?} must be a bare host or IP address")]
    BindAddr(String),

    #[error("admin.api_key must not be empty when set")]
    EmptyApiKey,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),
}

/// Validate a parsed config.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind_addr = &config.admin.bind_addr;
    if bind_addr.chars().any(char::is_whitespace) || bind_addr.contains("://") {
        errors.push(ValidationError::BindAddr(bind_addr.clone()));
    }

    if config.admin.api_key.as_deref().is_some_and(str::is_empty) {
        errors.push(ValidationError::EmptyApiKey);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
