//! HTTP middleware.

pub mod metrics;

pub use self::metrics::track_requests;
