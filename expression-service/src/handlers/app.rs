use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to Gene Expression Explorer API" }))
}

/// Liveness probe, polled by the launcher before it starts the frontend.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "expression-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
