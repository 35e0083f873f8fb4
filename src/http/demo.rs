//! Fan-out demonstration endpoint and small service routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::fanout::{FanOutMode, FanOutResult};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Path of the fan-out endpoint.
pub const FANOUT_PATH: &str = "/async-example";

#[derive(Debug, Default, Deserialize)]
pub struct FanOutQuery {
    #[serde(default)]
    pub mode: FanOutMode,
}

pub async fn run_fanout(
    State(state): State<AppState>,
    query: Result<Query<FanOutQuery>, QueryRejection>,
) -> Result<Json<FanOutResult>, ApiError> {
    let Query(query) = query?;
    let result = state.demo.run(query.mode).await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct ServiceIndex {
    pub name: &'static str,
    pub version: &'static str,
    pub operations: [String; 2],
    pub endpoints: &'static [&'static str],
}

pub async fn index(State(state): State<AppState>) -> Json<ServiceIndex> {
    tracing::info!("Accessed homepage '/'");
    let [a, b] = state.demo.labels();
    Json(ServiceIndex {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        operations: [a.to_string(), b.to_string()],
        endpoints: &[
            "GET /users",
            "POST /users",
            "GET /users/{id}",
            "PUT /users/{id}",
            "DELETE /users/{id}",
            "POST /welcome",
            "GET /edit/{id}",
            "POST /edit/{id}",
            "POST /delete/{id}",
            "GET /async-example",
            "POST /async-example",
            "GET /health",
        ],
    })
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
