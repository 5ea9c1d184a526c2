//! Test helpers for expression-service integration tests.
//!
//! Spawns the application on a random port with an in-memory dataset fetcher
//! so no test touches the real GEO repository.

#![allow(dead_code)]

use async_trait::async_trait;
use expression_service::config::{CacheConfig, ExpressionConfig};
use expression_service::models::GeoSeries;
use expression_service::services::providers::{
    ExpressionProvider, HealthPredictor, RandomExpressionProvider, RandomHealthPredictor,
};
use expression_service::services::soft::SoftParseError;
use expression_service::services::{DatasetCache, DatasetFetcher, FetchError};
use expression_service::startup::Application;
use expression_service::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fetcher that knows every `GSE<digits>` accession and counts calls.
pub struct FakeGeo {
    calls: AtomicUsize,
    delay: Duration,
}

impl FakeGeo {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetFetcher for FakeGeo {
    async fn fetch(&self, accession: &str) -> Result<GeoSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let known = accession
            .strip_prefix("GSE")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()));
        if !known {
            return Err(SoftParseError::MissingSeries(accession.to_string()).into());
        }

        Ok(GeoSeries {
            accession: accession.to_string(),
            title: format!("Series {}", accession),
            summary: "Expression profiling by array".to_string(),
            platform_id: "GPL570".to_string(),
            sample_ids: vec!["GSM1".to_string(), "GSM2".to_string(), "GSM3".to_string()],
        })
    }
}

pub struct TestApp {
    pub address: String,
    pub geo: Arc<FakeGeo>,
    pub state: AppState,
    client: reqwest::Client,
}

impl TestApp {
    /// Spawn with random providers and an instant fake GEO.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            FakeGeo::new(Duration::ZERO),
            Arc::new(RandomExpressionProvider::standard().expect("standard distributions")),
            Arc::new(RandomHealthPredictor),
        )
        .await
    }

    pub async fn spawn_with(
        geo: Arc<FakeGeo>,
        expression: Arc<dyn ExpressionProvider>,
        predictor: Arc<dyn HealthPredictor>,
    ) -> Self {
        let mut config = ExpressionConfig::default();
        config.common.port = 0;
        config.cache = CacheConfig {
            max_entries: 16,
            ttl_secs: 3600,
        };

        let datasets = Arc::new(DatasetCache::new(geo.clone(), &config.cache));
        let state = AppState::new(datasets, expression, predictor);

        let app = Application::build_with_state(config, state.clone())
            .await
            .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        Self {
            address,
            geo,
            state,
            client: reqwest::Client::new(),
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
