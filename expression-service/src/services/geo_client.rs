//! Client for the NCBI GEO repository.
//!
//! Series metadata is retrieved from the accession display endpoint in SOFT
//! text form and parsed into a [`GeoSeries`].

use crate::config::GeoConfig;
use crate::models::GeoSeries;
use crate::services::soft::{parse_series, SoftParseError};
use async_trait::async_trait;
use std::time::Duration;

/// Error type for dataset fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to reach GEO for {accession}: {source}")]
    Network {
        accession: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GEO returned status {status} for {accession}")]
    Status { accession: String, status: u16 },

    #[error(transparent)]
    Parse(#[from] SoftParseError),

    #[error("Failed to build GEO client: {0}")]
    Client(String),

    #[error("Fetch for {accession} did not complete: {reason}")]
    Interrupted { accession: String, reason: String },
}

/// Fetch-by-identifier access to a genomic data repository.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    async fn fetch(&self, accession: &str) -> Result<GeoSeries, FetchError>;
}

/// [`DatasetFetcher`] backed by the GEO accession display service.
#[derive(Clone)]
pub struct GeoClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(config: &GeoConfig) -> Result<Self, FetchError> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("expression-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DatasetFetcher for GeoClient {
    async fn fetch(&self, accession: &str) -> Result<GeoSeries, FetchError> {
        let network = |source| FetchError::Network {
            accession: accession.to_string(),
            source,
        };

        tracing::info!(accession = %accession, "Fetching series from GEO");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("acc", accession),
                ("targ", "self"),
                ("form", "text"),
                ("view", "brief"),
            ])
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                accession: accession.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(network)?;
        let series = parse_series(accession, &body)?;

        tracing::debug!(
            accession = %series.accession,
            samples = series.sample_ids.len(),
            "Parsed GEO series"
        );

        Ok(series)
    }
}
