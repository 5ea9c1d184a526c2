use axum::{
    extract::{Path, State},
    Json,
};

use crate::models::{GeneQuery, VisualizationPayload};
use crate::AppState;

pub async fn get_visualization(
    State(state): State<AppState>,
    Path((dataset_id, gene_id)): Path<(String, String)>,
) -> Json<VisualizationPayload> {
    let query = GeneQuery {
        gene_id,
        dataset_id,
    };
    Json(VisualizationPayload::boxplot(state.expression.sample(&query)))
}
