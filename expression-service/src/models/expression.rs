use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `POST /analyze/expression` and `POST /predict/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneQuery {
    pub gene_id: String,
    pub dataset_id: String,
}

/// Expression values per condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionData {
    pub healthy: Vec<f64>,
    pub diseased: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticsError {
    #[error("no {0} expression values to summarize")]
    EmptySample(&'static str),

    #[error("fold change is undefined: healthy mean is {0}")]
    UndefinedFoldChange(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatistics {
    pub healthy_mean: f64,
    pub diseased_mean: f64,
    pub fold_change: f64,
}

impl ExpressionStatistics {
    pub fn from_samples(data: &ExpressionData) -> Result<Self, StatisticsError> {
        let healthy_mean = mean(&data.healthy).ok_or(StatisticsError::EmptySample("healthy"))?;
        let diseased_mean =
            mean(&data.diseased).ok_or(StatisticsError::EmptySample("diseased"))?;

        let fold_change = diseased_mean / healthy_mean;
        if healthy_mean == 0.0 || !fold_change.is_finite() {
            return Err(StatisticsError::UndefinedFoldChange(healthy_mean));
        }

        Ok(Self {
            healthy_mean,
            diseased_mean,
            fold_change,
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Response of `POST /analyze/expression`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub expression_data: ExpressionData,
    pub statistics: ExpressionStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Diseased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPrediction {
    pub prediction: HealthStatus,
    /// Percentage in `[0, 100]`, two decimal places.
    pub confidence: f64,
}

impl HealthPrediction {
    pub fn new(prediction: HealthStatus, confidence: f64) -> Self {
        let clamped = confidence.clamp(0.0, 100.0);
        Self {
            prediction,
            confidence: (clamped * 100.0).round() / 100.0,
        }
    }
}

/// Response of `GET /visualization/:dataset_id/:gene_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ExpressionData,
}

impl VisualizationPayload {
    pub fn boxplot(data: ExpressionData) -> Self {
        Self {
            kind: "boxplot".to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_use_arithmetic_means() {
        let data = ExpressionData {
            healthy: vec![8.0, 10.0, 12.0],
            diseased: vec![15.0, 15.0],
        };
        let stats = ExpressionStatistics::from_samples(&data).unwrap();
        assert_eq!(stats.healthy_mean, 10.0);
        assert_eq!(stats.diseased_mean, 15.0);
        assert_eq!(stats.fold_change, 1.5);
    }

    #[test]
    fn zero_healthy_mean_is_rejected() {
        let data = ExpressionData {
            healthy: vec![-1.0, 1.0],
            diseased: vec![3.0],
        };
        assert_eq!(
            ExpressionStatistics::from_samples(&data),
            Err(StatisticsError::UndefinedFoldChange(0.0))
        );
    }

    #[test]
    fn empty_sample_is_rejected() {
        let data = ExpressionData {
            healthy: vec![1.0],
            diseased: vec![],
        };
        assert_eq!(
            ExpressionStatistics::from_samples(&data),
            Err(StatisticsError::EmptySample("diseased"))
        );
    }

    #[test]
    fn prediction_confidence_is_rounded_and_clamped() {
        assert_eq!(
            HealthPrediction::new(HealthStatus::Healthy, 42.4567).confidence,
            42.46
        );
        assert_eq!(
            HealthPrediction::new(HealthStatus::Diseased, 120.0).confidence,
            100.0
        );
    }

    #[test]
    fn health_status_serializes_lowercase() {
        let json = serde_json::to_value(HealthPrediction::new(HealthStatus::Diseased, 1.0)).unwrap();
        assert_eq!(json["prediction"], "diseased");
    }

    #[test]
    fn visualization_payload_uses_type_key() {
        let json = serde_json::to_value(VisualizationPayload::boxplot(ExpressionData {
            healthy: vec![],
            diseased: vec![],
        }))
        .unwrap();
        assert_eq!(json["type"], "boxplot");
        assert!(json["data"]["healthy"].is_array());
    }
}
