//! Expression data and health prediction providers.
//!
//! Handlers only see the traits, so the random demo generators can be
//! swapped for deterministic fakes or a real analysis backend.

pub mod fixed;
pub mod random;

use crate::models::{ExpressionData, GeneQuery, HealthPrediction};
use thiserror::Error;

pub use fixed::{FixedExpressionProvider, FixedHealthPredictor};
pub use random::{RandomExpressionProvider, RandomHealthPredictor, SampleDistribution};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),
}

/// Source of per-condition expression values for a gene.
pub trait ExpressionProvider: Send + Sync {
    fn sample(&self, query: &GeneQuery) -> ExpressionData;
}

/// Classifier producing a health status for a gene.
pub trait HealthPredictor: Send + Sync {
    fn predict(&self, query: &GeneQuery) -> HealthPrediction;
}
