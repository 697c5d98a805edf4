//! HTTP surface of the interceptor: router, shared state and metrics.

pub mod api;
pub mod metrics;
pub mod state;
