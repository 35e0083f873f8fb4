//! Error responses.
//!
//! Handlers return `ApiError`, which maps each failure to a status code and a
//! JSON body:
//!
//! ```json
//! {"error": "operation_failed", "message": "...", "operation": "operation_a"}
//! ```
//!
//! - invalid input → 400, malformed requests keep the extractor's status
//! - unknown user → 404
//! - fan-out operation failed → 502
//! - record store unreachable → 503, other store failures → 500

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fanout::FanOutError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    FanOut(#[from] FanOutError),

    /// The request could not be extracted (bad path, query or body).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

impl_from_rejection!(JsonRejection, FormRejection, PathRejection, QueryRejection);

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::Invalid(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::Query(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FanOut(FanOutError::Operation { .. }) => StatusCode::BAD_GATEWAY,
            Self::FanOut(FanOutError::DuplicateLabel(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Store(StoreError::Invalid(_)) => "invalid_request",
            Self::Store(StoreError::NotFound(_)) => "not_found",
            Self::Store(StoreError::Connection(_)) => "store_unavailable",
            Self::Store(StoreError::Query(_)) => "store_error",
            Self::FanOut(FanOutError::Operation { .. }) => "operation_failed",
            Self::FanOut(FanOutError::DuplicateLabel(_)) => "misconfigured",
            Self::Rejected { .. } => "invalid_request",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let operation = match self {
            Self::FanOut(e) => e.operation().map(str::to_string),
            Self::Store(_) | Self::Rejected { .. } => None,
        };
        ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
            operation,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
