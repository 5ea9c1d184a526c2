pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use services::providers::{ExpressionProvider, HealthPredictor};
use services::DatasetCache;
use std::sync::Arc;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<DatasetCache>,
    pub expression: Arc<dyn ExpressionProvider>,
    pub predictor: Arc<dyn HealthPredictor>,
}

impl AppState {
    pub fn new(
        datasets: Arc<DatasetCache>,
        expression: Arc<dyn ExpressionProvider>,
        predictor: Arc<dyn HealthPredictor>,
    ) -> Self {
        Self {
            datasets,
            expression,
            predictor,
        }
    }
}
