//! Span export to a trace agent.
//!
//! `SpanAgentLayer` is a `tracing_subscriber` layer that times every span and,
//! when the span closes, sends one JSON datagram describing it over UDP:
//!
//! ```json
//! {"trace_id": 1, "span_id": 2, "parent_id": null, "name": "fanout.main",
//!  "service": "fanout-demo", "start_unix_nanos": 0, "end_unix_nanos": 0,
//!  "duration_nanos": 0, "meta": {"mode": "concurrent"}}
//! ```
//!
//! A root span with a `trace_id` field starts its trace under that id;
//! otherwise a random one is drawn. Children inherit their parent's trace.
//!
//! The socket is non-blocking and send errors are dropped, so an absent or
//! slow agent cannot hold up a request.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Span field a root span may use to choose its trace id.
pub const TRACE_ID_FIELD: &str = "trace_id";

/// One finished span as sent to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub trace_id: u64,
    pub span_id: u64,
    pub parent_id: Option<u64>,
    pub name: String,
    pub service: String,
    pub start_unix_nanos: u64,
    pub end_unix_nanos: u64,
    pub duration_nanos: u64,
    pub meta: Map<String, Value>,
}

/// Per-span bookkeeping stored in the registry's extensions.
struct SpanTiming {
    trace_id: u64,
    span_id: u64,
    parent_id: Option<u64>,
    started_at: SystemTime,
    started: Instant,
    meta: Map<String, Value>,
}

/// Layer that exports closed spans to a UDP agent.
#[derive(Debug)]
pub struct SpanAgentLayer {
    socket: UdpSocket,
    agent: SocketAddr,
    service: String,
}

impl SpanAgentLayer {
    /// Resolve the agent address and open a non-blocking socket towards it.
    pub fn connect(host: &str, port: u16, service: impl Into<String>) -> io::Result<Self> {
        let agent = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("trace agent {host}:{port} did not resolve"),
            )
        })?;
        let bind: SocketAddr = if agent.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;

        Ok(Self {
            socket,
            agent,
            service: service.into(),
        })
    }

    pub fn agent(&self) -> SocketAddr {
        self.agent
    }
}

impl<S> Layer<S> for SpanAgentLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let parent_ids = span.parent().and_then(|parent| {
            let extensions = parent.extensions();
            let ids = extensions
                .get::<SpanTiming>()
                .map(|t| (t.trace_id, t.span_id));
            ids
        });
        let mut meta = Map::new();
        attrs.record(&mut JsonVisitor(&mut meta));

        // A root span may bring its own trace id so logs can reference it.
        let (trace_id, parent_id) = match parent_ids {
            Some((trace_id, parent_span)) => (trace_id, Some(parent_span)),
            None => (
                meta.get(TRACE_ID_FIELD)
                    .and_then(Value::as_u64)
                    .unwrap_or_else(rand::random),
                None,
            ),
        };

        span.extensions_mut().insert(SpanTiming {
            trace_id,
            span_id: rand::random(),
            parent_id,
            started_at: SystemTime::now(),
            started: Instant::now(),
            meta,
        });
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(timing) = extensions.get_mut::<SpanTiming>() {
            values.record(&mut JsonVisitor(&mut timing.meta));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let extensions = span.extensions();
        let Some(timing) = extensions.get::<SpanTiming>() else {
            return;
        };

        let duration = timing.started.elapsed();
        let start = timing
            .started_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let record = SpanRecord {
            trace_id: timing.trace_id,
            span_id: timing.span_id,
            parent_id: timing.parent_id,
            name: span.name().to_string(),
            service: self.service.clone(),
            start_unix_nanos: nanos(start),
            end_unix_nanos: nanos(start + duration),
            duration_nanos: nanos(duration),
            meta: timing.meta.clone(),
        };

        // WouldBlock and ICMP-refused errors are expected without an agent.
        if let Ok(bytes) = serde_json::to_vec(&record) {
            let _ = self.socket.send_to(&bytes, self.agent);
        }
    }
}

fn nanos(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

struct JsonVisitor<'a>(&'a mut Map<String, Value>);

impl Visit for JsonVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), Value::from(format!("{value:?}")));
    }
}
