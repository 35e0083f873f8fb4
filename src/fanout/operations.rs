//! Stand-in slow operations.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::OperationConfig;

const PHRASES: &[&str] = &[
    "The only way to do great work is to love what you do.",
    "Code is poetry.",
    "First, solve the problem. Then, write the code.",
    "Programs must be written for people to read.",
    "Design for failure.",
    "Keep it logically awesome.",
];

/// Why a single operation failed.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("simulated failure after {0:?}")]
    Injected(Duration),
}

/// An independent, latency-bound unit of work.
#[async_trait]
pub trait SlowOperation: Send + Sync {
    /// Key the result is reported under.
    fn label(&self) -> &str;

    async fn run(&self) -> Result<Value, OperationError>;
}

/// Sleeps for a fixed delay and returns a phrase.
#[derive(Debug, Clone)]
pub struct SimulatedOperation {
    label: String,
    delay: Duration,
    fail: bool,
}

impl SimulatedOperation {
    pub fn new(label: impl Into<String>, delay: Duration) -> Self {
        Self {
            label: label.into(),
            delay,
            fail: false,
        }
    }

    /// Fail deterministically once the delay has elapsed.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl SlowOperation for SimulatedOperation {
    fn label(&self) -> &str {
        &self.label
    }

    async fn run(&self) -> Result<Value, OperationError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(OperationError::Injected(self.delay));
        }
        let message = PHRASES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default();
        Ok(json!({
            "operation": self.label,
            "delay_seconds": self.delay.as_secs_f64(),
            "message": message,
        }))
    }
}

/// GETs a URL, then sleeps for a fixed delay.
#[derive(Debug, Clone)]
pub struct FetchOperation {
    label: String,
    client: reqwest::Client,
    url: String,
    delay: Duration,
}

impl FetchOperation {
    pub fn new(
        label: impl Into<String>,
        client: reqwest::Client,
        url: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            client,
            url: url.into(),
            delay,
        }
    }
}

#[async_trait]
impl SlowOperation for FetchOperation {
    fn label(&self) -> &str {
        &self.label
    }

    async fn run(&self) -> Result<Value, OperationError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OperationError::Status(status.as_u16()));
        }
        let body = response.text().await?;

        tokio::time::sleep(self.delay).await;

        Ok(json!({
            "operation": self.label,
            "delay_seconds": self.delay.as_secs_f64(),
            "status": status.as_u16(),
            "message": body.trim(),
        }))
    }
}

/// Build the operation described by `config`.
pub fn from_config(config: &OperationConfig, client: &reqwest::Client) -> Box<dyn SlowOperation> {
    let delay = Duration::from_millis(config.delay_ms);
    match &config.fetch_url {
        Some(url) if !config.fail => Box::new(FetchOperation::new(
            config.label.trim(),
            client.clone(),
            url,
            delay,
        )),
        _ => {
            let op = SimulatedOperation::new(config.label.trim(), delay);
            if config.fail {
                Box::new(op.failing())
            } else {
                Box::new(op)
            }
        }
    }
}
