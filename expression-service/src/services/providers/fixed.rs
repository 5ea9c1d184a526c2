//! Deterministic providers for tests and offline demos.

use super::{ExpressionProvider, HealthPredictor};
use crate::models::{ExpressionData, GeneQuery, HealthPrediction};

#[derive(Debug, Clone)]
pub struct FixedExpressionProvider {
    data: ExpressionData,
}

impl FixedExpressionProvider {
    pub fn new(data: ExpressionData) -> Self {
        Self { data }
    }
}

impl ExpressionProvider for FixedExpressionProvider {
    fn sample(&self, _query: &GeneQuery) -> ExpressionData {
        self.data.clone()
    }
}

#[derive(Debug, Clone)]
pub struct FixedHealthPredictor {
    prediction: HealthPrediction,
}

impl FixedHealthPredictor {
    pub fn new(prediction: HealthPrediction) -> Self {
        Self { prediction }
    }
}

impl HealthPredictor for FixedHealthPredictor {
    fn predict(&self, _query: &GeneQuery) -> HealthPrediction {
        self.prediction.clone()
    }
}
