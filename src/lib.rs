//! admit-standardizer library interface
//!
//! Normalizes free-text admissions records of the form
//! "program name, university name" into a canonical pair, rules first,
//! with a local-model fallback for records the rules cannot parse
//! confidently.

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult, Error, Result};

use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::registry::Registry;
use crate::services::{BatchStandardizer, FallbackStandardizer, LlmClient, ModelConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Canonical registries, read-only after load.
    pub registry: Arc<Registry>,
    /// Shared batch orchestrator (owns the fallback service and cache).
    pub batch: Arc<BatchStandardizer>,
}

impl AppState {
    /// Build the full pipeline from configuration and a model client.
    pub fn new(config: &Config, client: Arc<dyn LlmClient>) -> Self {
        let registry = Arc::new(Registry::load(
            &config.canon_universities_path,
            &config.canon_programs_path,
        ));
        let fallback = Arc::new(FallbackStandardizer::new(
            client,
            ModelConfig::from_config(config),
            Arc::clone(&registry),
        ));
        let batch = Arc::new(BatchStandardizer::new(
            Arc::clone(&registry),
            fallback,
            config.max_workers,
        ));

        Self { registry, batch }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::standardize_routes())
        .with_state(state)
}
