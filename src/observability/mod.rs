//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, JSON by default)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (spans exported to a UDP trace agent)
//!
//! Consumers:
//!     → stdout log collection
//!     → Metrics endpoint (Prometheus scrape, optional)
//!     → Trace agent (fire-and-forget)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span into every log line
//! - Span export never blocks or fails a request
//! - Metrics are optional and cheap when disabled

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::logging::init_logging;
pub use self::tracing::{SpanAgentLayer, SpanRecord};
