pub mod dataset;
pub mod expression;

pub use dataset::{featured_datasets, DatasetRecord, DatasetSummary, GeoSeries};
pub use expression::{
    AnalysisResponse, ExpressionData, ExpressionStatistics, GeneQuery, HealthPrediction,
    HealthStatus, StatisticsError, VisualizationPayload,
};
