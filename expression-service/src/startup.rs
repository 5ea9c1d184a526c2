//! Application startup and lifecycle management.

use crate::config::{CorsConfig, ExpressionConfig};
use crate::handlers::{
    analysis::{analyze_expression, predict_health},
    app::{health_check, not_found, root},
    datasets::{get_dataset, search_datasets},
    metrics::metrics,
    visualization::get_visualization,
};
use crate::services::providers::{RandomExpressionProvider, RandomHealthPredictor};
use crate::services::{DatasetCache, GeoClient};
use crate::AppState;
use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use service_core::shutdown::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/datasets/search/:query", get(search_datasets))
        .route("/dataset/:dataset_id", get(get_dataset))
        .route("/analyze/expression", post(analyze_expression))
        .route("/predict/health", post(predict_health))
        .route("/visualization/:dataset_id/:gene_id", get(get_visualization))
        .fallback(not_found)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(cors_layer(cors))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.is_wide_open() {
        tracing::warn!(
            "CORS mirrors every origin with credentials allowed; \
             set CORS_ALLOWED_ORIGINS outside local development"
        );
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the production GEO client and random
    /// providers.
    pub async fn build(config: ExpressionConfig) -> Result<Self, AppError> {
        let geo = GeoClient::new(&config.geo).map_err(|e| AppError::ConfigError(e.into()))?;
        tracing::info!(base_url = %geo.base_url(), "Initialized GEO client");

        let datasets = Arc::new(DatasetCache::new(Arc::new(geo), &config.cache));
        let expression = RandomExpressionProvider::standard()
            .map_err(|e| AppError::ConfigError(e.into()))?;

        let state = AppState::new(
            datasets,
            Arc::new(expression),
            Arc::new(RandomHealthPredictor),
        );

        Self::build_with_state(config, state).await
    }

    /// Build the application around an existing state (used by tests to
    /// inject fakes).
    pub async fn build_with_state(
        config: ExpressionConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            cache_max_entries = config.cache.max_entries,
            cache_ttl_secs = config.cache.ttl_secs,
            "Expression service bound"
        );

        let router = build_router(state, &config.cors);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
