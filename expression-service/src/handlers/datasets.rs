use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::models::{featured_datasets, DatasetRecord, DatasetSummary};
use crate::AppState;

/// The query is not matched against any catalog; every search returns the
/// featured datasets.
pub async fn search_datasets(Path(query): Path<String>) -> Json<Vec<DatasetRecord>> {
    tracing::debug!(query = %query, "Dataset search");
    Json(featured_datasets())
}

pub async fn get_dataset(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<DatasetSummary>, AppError> {
    let series = state
        .datasets
        .get_or_fetch(&dataset_id)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(series.summary()))
}
