//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    middleware,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::fanout::{FanOutDemo, FanOutError};
use crate::http::demo::{self, FANOUT_PATH};
use crate::http::middleware::track_requests;
use crate::http::request::{make_request_span, MakeRequestUuid};
use crate::http::users;
use crate::store::UserRepository;

/// Failure assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    FanOut(#[from] FanOutError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub demo: Arc<FanOutDemo>,
}

/// Shared client for operations that fetch a URL.
fn fetch_client(config: &AppConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.demo.fetch_timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server from configuration and a record store.
    pub fn new(config: AppConfig, users: Arc<dyn UserRepository>) -> Result<Self, ServerError> {
        let client = fetch_client(&config)?;
        let demo = FanOutDemo::from_config(&config.demo, &client)?;

        Ok(Self::with_state(
            config,
            AppState {
                users,
                demo: Arc::new(demo),
            },
        ))
    }

    /// Create a server around an already assembled state.
    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(demo::index))
            .route("/health", get(demo::health))
            .route("/favicon.ico", get(demo::favicon))
            .route("/users", get(users::list_users).post(users::create_user))
            .route(
                "/users/{id}",
                get(users::get_user)
                    .put(users::update_user)
                    .delete(users::delete_user),
            )
            .route("/welcome", post(users::welcome))
            .route("/edit/{id}", get(users::get_user).post(users::edit_user))
            .route("/delete/{id}", post(users::delete_user))
            .route(FANOUT_PATH, get(demo::run_fanout).post(demo::run_fanout))
            .route_layer(middleware::from_fn(track_requests))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
