//! HTTP API handlers.

pub mod health;
pub mod standardize;

pub use health::health_routes;
pub use standardize::standardize_routes;
