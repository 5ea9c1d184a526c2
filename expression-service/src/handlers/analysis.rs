use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::models::{AnalysisResponse, ExpressionStatistics, GeneQuery, HealthPrediction};
use crate::utils::ApiJson;
use crate::AppState;

pub async fn analyze_expression(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<GeneQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    tracing::debug!(
        gene_id = %query.gene_id,
        dataset_id = %query.dataset_id,
        "Analyzing expression"
    );

    let expression_data = state.expression.sample(&query);
    let statistics = ExpressionStatistics::from_samples(&expression_data)
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

    Ok(Json(AnalysisResponse {
        expression_data,
        statistics,
    }))
}

pub async fn predict_health(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<GeneQuery>,
) -> Json<HealthPrediction> {
    tracing::debug!(
        gene_id = %query.gene_id,
        dataset_id = %query.dataset_id,
        "Predicting health status"
    );

    Json(state.predictor.predict(&query))
}
