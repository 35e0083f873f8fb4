//! Concurrent fan-out demonstration.
//!
//! # Data Flow
//! ```text
//! /async-example
//!     → FanOutDemo::run(mode)
//!         span fanout.main
//!         ├── span fanout.operation (operation_a) ──┐
//!         └── span fanout.operation (operation_b) ──┴→ join
//!     → FanOutResult { results, total_time_seconds }
//! ```
//!
//! # Design Decisions
//! - Both operations are polled on the calling task; their waits overlap
//!   without spawning, so elapsed time is about max(a, b), not a + b
//! - The join is fail-fast: the first error drops the other branch and no
//!   partial result escapes
//! - Every error carries the label of the operation that produced it

pub mod operations;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::DemoConfig;
use crate::observability::metrics;

pub use operations::{FetchOperation, OperationError, SimulatedOperation, SlowOperation};

/// How the two operations are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOutMode {
    #[default]
    Concurrent,
    Sequential,
}

impl fmt::Display for FanOutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concurrent => f.write_str("concurrent"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// Outcome of one fan-out run.
#[derive(Debug, Clone, Serialize)]
pub struct FanOutResult {
    /// Each operation's payload, keyed by its label.
    pub results: BTreeMap<String, Value>,
    pub total_time_seconds: f64,
    pub mode: FanOutMode,
    #[serde(skip)]
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum FanOutError {
    /// One of the operations failed; `label` names it.
    #[error("operation '{label}' failed: {source}")]
    Operation {
        label: String,
        #[source]
        source: OperationError,
    },

    #[error("operations must have distinct labels, both are '{0}'")]
    DuplicateLabel(String),
}

impl FanOutError {
    /// Label of the failing operation, if the failure came from one.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Operation { label, .. } => Some(label),
            Self::DuplicateLabel(_) => None,
        }
    }
}

/// Runs two independent slow operations and times them.
pub struct FanOutDemo {
    operation_a: Box<dyn SlowOperation>,
    operation_b: Box<dyn SlowOperation>,
}

impl fmt::Debug for FanOutDemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOutDemo")
            .field("operation_a", &self.operation_a.label())
            .field("operation_b", &self.operation_b.label())
            .finish()
    }
}

impl FanOutDemo {
    pub fn new(
        operation_a: Box<dyn SlowOperation>,
        operation_b: Box<dyn SlowOperation>,
    ) -> Result<Self, FanOutError> {
        if operation_a.label() == operation_b.label() {
            return Err(FanOutError::DuplicateLabel(operation_a.label().to_string()));
        }
        Ok(Self {
            operation_a,
            operation_b,
        })
    }

    /// Build both operations from configuration, sharing one HTTP client.
    pub fn from_config(config: &DemoConfig, client: &reqwest::Client) -> Result<Self, FanOutError> {
        Self::new(
            operations::from_config(&config.operation_a, client),
            operations::from_config(&config.operation_b, client),
        )
    }

    pub fn labels(&self) -> [&str; 2] {
        [self.operation_a.label(), self.operation_b.label()]
    }

    /// Run both operations concurrently and join on their results.
    pub async fn run_demo(&self) -> Result<FanOutResult, FanOutError> {
        self.run(FanOutMode::Concurrent).await
    }

    pub async fn run(&self, mode: FanOutMode) -> Result<FanOutResult, FanOutError> {
        let span = tracing::info_span!("fanout.main", mode = %mode);
        let outcome = self.execute(mode).instrument(span).await;
        metrics::record_fanout(mode, outcome.as_ref().map(|r| r.elapsed).ok());
        outcome
    }

    async fn execute(&self, mode: FanOutMode) -> Result<FanOutResult, FanOutError> {
        tracing::info!(operations = ?self.labels(), "Starting fan-out");

        let start = Instant::now();
        let (a, b) = match mode {
            FanOutMode::Concurrent => tokio::try_join!(
                attributed(self.operation_a.as_ref()),
                attributed(self.operation_b.as_ref()),
            )?,
            FanOutMode::Sequential => (
                attributed(self.operation_a.as_ref()).await?,
                attributed(self.operation_b.as_ref()).await?,
            ),
        };
        let elapsed = start.elapsed();

        tracing::info!(
            total_time_seconds = elapsed.as_secs_f64(),
            "Completed fan-out in {:.2} seconds",
            elapsed.as_secs_f64()
        );

        Ok(FanOutResult {
            results: BTreeMap::from([a, b]),
            total_time_seconds: elapsed.as_secs_f64(),
            mode,
            elapsed,
        })
    }
}

/// Run one operation in its own child span, tagging success or failure with
/// the operation's label.
async fn attributed(op: &dyn SlowOperation) -> Result<(String, Value), FanOutError> {
    let label = op.label().to_string();
    let span = tracing::info_span!("fanout.operation", operation = %label);

    match op.run().instrument(span).await {
        Ok(value) => Ok((label, value)),
        Err(source) => {
            tracing::warn!(operation = %label, error = %source, "Fan-out operation failed");
            Err(FanOutError::Operation { label, source })
        }
    }
}
