//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use fanout_demo::config::AppConfig;
use fanout_demo::http::HttpServer;
use fanout_demo::lifecycle::Shutdown;
use fanout_demo::store::InMemoryUserRepository;

/// Default config with both operations at `delay_ms` and no span export.
pub fn test_config(delay_ms: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.demo.operation_a.delay_ms = delay_ms;
    config.demo.operation_b.delay_ms = delay_ms;
    config.observability.tracing_enabled = false;
    config
}

/// Router over a fresh in-memory store.
#[allow(dead_code)]
pub fn app(config: AppConfig) -> Router {
    HttpServer::new(config, Arc::new(InMemoryUserRepository::new()))
        .unwrap()
        .router()
}

/// Drive one request through the router and decode the JSON body (Null if empty).
#[allow(dead_code)]
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    decode(response).await
}

/// Post an urlencoded form.
#[allow(dead_code)]
pub async fn send_form(router: &Router, uri: &str, form: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    decode(response).await
}

/// Send a raw body with an optional content type.
#[allow(dead_code)]
pub async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    decode(response).await
}

async fn decode(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Serve `config` on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(InMemoryUserRepository::new())).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
