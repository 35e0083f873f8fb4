//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Record store connection settings.
    pub database: DatabaseConfig,

    /// The two operations run by the fan-out endpoint.
    pub demo: DemoConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8004").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8004".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Record store configuration.
///
/// Without a `url` the service keeps users in memory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: Option<String>,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// Time allowed to obtain a pooled connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            connect_timeout_secs: 5,
        }
    }
}

/// Fan-out demonstration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    pub operation_a: OperationConfig,
    pub operation_b: OperationConfig,

    /// Timeout for operations that fetch a URL, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            operation_a: OperationConfig::labelled("operation_a"),
            operation_b: OperationConfig::labelled("operation_b"),
            fetch_timeout_secs: 10,
        }
    }
}

/// One slow operation of the fan-out pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OperationConfig {
    /// Key under which the operation's result is reported.
    pub label: String,

    /// Simulated latency in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// When set, the operation GETs this URL before its delay.
    #[serde(default)]
    pub fetch_url: Option<String>,

    /// Make the operation fail after its delay.
    #[serde(default)]
    pub fail: bool,
}

impl OperationConfig {
    pub fn labelled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            delay_ms: default_delay_ms(),
            fetch_url: None,
            fail: false,
        }
    }
}

fn default_delay_ms() -> u64 {
    1000
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Service name attached to exported spans.
    pub service_name: String,

    /// Export spans to the trace agent.
    pub tracing_enabled: bool,

    /// Trace agent host.
    pub trace_agent_host: String,

    /// Trace agent UDP port.
    pub trace_agent_port: u16,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            service_name: "fanout-demo".to_string(),
            tracing_enabled: true,
            trace_agent_host: "127.0.0.1".to_string(),
            trace_agent_port: 8126,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
