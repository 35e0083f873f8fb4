//! User records over HTTP plus a concurrent fan-out demonstration.

pub mod config;
pub mod fanout;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::AppConfig;
pub use fanout::{FanOutDemo, FanOutError, FanOutMode, FanOutResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
