//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: file (if any), then environment overrides, then
/// validation.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };

    resolve_config(config, |key| std::env::var(key).ok())
}

/// Apply environment overrides and validate.
///
/// Rejected environment values are reported alongside validation errors.
pub fn resolve_config<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = apply_env_overrides(&mut config, lookup);
    if let Err(invalid) = validate_config(&config) {
        errors.extend(invalid);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Unparseable values leave the setting untouched and are returned.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Vec<ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut rejected = Vec::new();

    if let Some(addr) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(url) = lookup("DATABASE_URL") {
        config.database.url = Some(url).filter(|u| !u.is_empty());
    }
    if let Some(host) = lookup("TRACE_AGENT_HOST") {
        config.observability.trace_agent_host = host;
    }
    if let Some(port) = lookup("TRACE_AGENT_PORT") {
        match port.parse() {
            Ok(port) => config.observability.trace_agent_port = port,
            Err(_) => rejected.push(ValidationError::InvalidEnv {
                key: "TRACE_AGENT_PORT",
                value: port,
            }),
        }
    }
    if let Some(enabled) = lookup("TRACING_ENABLED") {
        match enabled.parse() {
            Ok(enabled) => config.observability.tracing_enabled = enabled,
            Err(_) => rejected.push(ValidationError::InvalidEnv {
                key: "TRACING_ENABLED",
                value: enabled,
            }),
        }
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        match format.parse() {
            Ok(format) => config.observability.log_format = format,
            Err(_) => rejected.push(ValidationError::InvalidEnv {
                key: "LOG_FORMAT",
                value: format,
            }),
        }
    }
    rejected
}
