//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber once at startup
//! - JSON lines (current span and span list attached) or pretty output
//! - Attach the span exporter when tracing is enabled
//!
//! `RUST_LOG` takes precedence over the configured level.

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::tracing::SpanAgentLayer;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    format!("fanout_demo={level},tower_http={level},sqlx=warn")
}

/// JSON lines layer.
///
/// Every line lists the enclosing spans, so the request span's `trace_id`
/// and `request_id` appear on events logged deep inside a handler.
pub fn json_layer<S, W>(writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(writer)
        .boxed()
}

/// Install the global subscriber.
///
/// A span exporter that cannot be created is logged and skipped; it never
/// prevents startup.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter(&config.log_level))?,
    };

    let fmt_layer = match config.log_format {
        LogFormat::Json => json_layer(std::io::stdout),
        LogFormat::Pretty => fmt::layer().boxed(),
    };

    let (agent_layer, agent_error) = if config.tracing_enabled {
        match SpanAgentLayer::connect(
            &config.trace_agent_host,
            config.trace_agent_port,
            config.service_name.clone(),
        ) {
            Ok(layer) => (Some(layer), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };
    let agent = agent_layer.as_ref().map(SpanAgentLayer::agent);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(agent_layer)
        .try_init()?;

    match (agent, agent_error) {
        (Some(agent), _) => tracing::info!(%agent, "Exporting spans to trace agent"),
        (None, Some(e)) => tracing::warn!(
            host = %config.trace_agent_host,
            port = config.trace_agent_port,
            error = %e,
            "Trace agent unavailable, span export disabled"
        ),
        (None, None) => tracing::debug!("Span export disabled"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::make_request_span;
    use crate::observability::tracing::SpanRecord;
    use axum::http::Request;
    use serde_json::Value;
    use std::io;
    use std::net::UdpSocket;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing_subscriber::Registry;

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_log_lines_carry_exported_trace_id() {
        let agent = UdpSocket::bind("127.0.0.1:0").unwrap();
        agent
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = agent.local_addr().unwrap().port();
        let exporter = SpanAgentLayer::connect("127.0.0.1", port, "svc").unwrap();
        let logs = Captured::default();
        let subscriber = Registry::default()
            .with(json_layer(logs.clone()))
            .with(exporter);

        let request = Request::builder().uri("/users").body(()).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            let span = make_request_span(&request);
            let _entered = span.enter();
            let _inner = tracing::info_span!("fanout.main").entered();
            tracing::info!("handled");
        });

        let mut buf = [0u8; 4096];
        let mut records = Vec::new();
        for _ in 0..2 {
            let len = agent.recv(&mut buf).unwrap();
            records.push(serde_json::from_slice::<SpanRecord>(&buf[..len]).unwrap());
        }
        let request_span = records.iter().find(|r| r.name == "http.request").unwrap();

        let output = logs.0.lock().unwrap().clone();
        let line: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(line["fields"]["message"], "handled");
        assert_eq!(line["spans"][0]["name"], "http.request");
        assert_eq!(line["spans"][0]["trace_id"], request_span.trace_id);
        assert!(records.iter().all(|r| r.trace_id == request_span.trace_id));
    }

    #[test]
    fn test_default_filter_parses() {
        let directive = default_filter("debug");
        assert!(directive.contains("fanout_demo=debug"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
