//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → users.rs (CRUD → UserRepository)
//!       demo.rs  (fan-out → FanOutDemo)
//!     → response.rs (errors → status + JSON body)
//!     → Send to client
//! ```

pub mod demo;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod users;

pub use demo::FANOUT_PATH;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer, ServerError};
