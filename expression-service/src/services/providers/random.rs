//! Random demo providers.

use super::{ExpressionProvider, HealthPredictor, ProviderError};
use crate::models::{ExpressionData, GeneQuery, HealthPrediction, HealthStatus};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Normal distribution sampled `count` times per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl SampleDistribution {
    pub const HEALTHY: Self = Self {
        mean: 10.0,
        std_dev: 2.0,
        count: 20,
    };

    pub const DISEASED: Self = Self {
        mean: 15.0,
        std_dev: 3.0,
        count: 20,
    };

    fn normal(&self) -> Result<Normal<f64>, ProviderError> {
        Normal::new(self.mean, self.std_dev).map_err(|e| {
            ProviderError::InvalidDistribution(format!(
                "N({}, {}): {}",
                self.mean, self.std_dev, e
            ))
        })
    }
}

pub struct RandomExpressionProvider {
    healthy: Normal<f64>,
    diseased: Normal<f64>,
    healthy_count: usize,
    diseased_count: usize,
}

impl RandomExpressionProvider {
    pub fn new(
        healthy: SampleDistribution,
        diseased: SampleDistribution,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            healthy: healthy.normal()?,
            diseased: diseased.normal()?,
            healthy_count: healthy.count,
            diseased_count: diseased.count,
        })
    }

    /// Healthy N(10, 2) and diseased N(15, 3), 20 values each.
    pub fn standard() -> Result<Self, ProviderError> {
        Self::new(SampleDistribution::HEALTHY, SampleDistribution::DISEASED)
    }
}

impl ExpressionProvider for RandomExpressionProvider {
    fn sample(&self, _query: &GeneQuery) -> ExpressionData {
        let mut rng = rand::thread_rng();
        ExpressionData {
            healthy: self.healthy.sample_iter(&mut rng).take(self.healthy_count).collect(),
            diseased: self
                .diseased
                .sample_iter(&mut rng)
                .take(self.diseased_count)
                .collect(),
        }
    }
}

/// Coin-flip prediction with an unrelated uniform confidence.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHealthPredictor;

impl HealthPredictor for RandomHealthPredictor {
    fn predict(&self, _query: &GeneQuery) -> HealthPrediction {
        let mut rng = rand::thread_rng();
        let prediction = if rng.gen::<f64>() > 0.5 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Diseased
        };
        HealthPrediction::new(prediction, rng.gen::<f64>() * 100.0)
    }
}
