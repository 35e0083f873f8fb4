//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem found is
//! reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, OperationConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: label must not be empty")]
    EmptyLabel { field: &'static str },

    #[error("operation labels must differ (both are '{0}')")]
    DuplicateLabel(String),

    #[error("{field}: '{value}' is not a valid URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{key}: '{value}' is not a valid value")]
    InvalidEnv { key: &'static str, value: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_operation(&mut errors, "demo.operation_a", &config.demo.operation_a);
    check_operation(&mut errors, "demo.operation_b", &config.demo.operation_b);
    let label = config.demo.operation_a.label.trim();
    if !label.is_empty() && label == config.demo.operation_b.label.trim() {
        errors.push(ValidationError::DuplicateLabel(label.to_string()));
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("listener.max_body_bytes"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.demo.fetch_timeout_secs == 0 {
        errors.push(ValidationError::Zero("demo.fetch_timeout_secs"));
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::Zero("database.max_connections"));
    }
    if config.observability.tracing_enabled && config.observability.trace_agent_port == 0 {
        errors.push(ValidationError::Zero("observability.trace_agent_port"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_operation(errors: &mut Vec<ValidationError>, field: &'static str, op: &OperationConfig) {
    if op.label.trim().is_empty() {
        errors.push(ValidationError::EmptyLabel { field });
    }
    if let Some(url) = &op.fetch_url {
        if reqwest::Url::parse(url).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: url.clone(),
            });
        }
    }
}
