use crate::config::ReadinessConfig;
use crate::error::LaunchError;
use std::time::{Duration, Instant};

/// Polls a health endpoint until it answers with a 2xx status.
pub struct ReadinessProbe {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl ReadinessProbe {
    pub fn new(config: &ReadinessConfig) -> Result<Self, LaunchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            client,
            url: config.url.trim().to_string(),
            poll_interval: config.poll_interval(),
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn wait_until_ready(&self) -> Result<(), LaunchError> {
        let start = Instant::now();
        tracing::info!(url = %self.url, timeout_secs = self.timeout.as_secs(), "Waiting for backend");

        loop {
            let last_error = match self.client.get(&self.url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(
                        url = %self.url,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Backend is ready"
                    );
                    return Ok(());
                }
                Ok(resp) => format!("status {}", resp.status()),
                Err(e) => e.to_string(),
            };

            if start.elapsed() >= self.timeout {
                return Err(LaunchError::NotReady {
                    url: self.url.clone(),
                    timeout_secs: self.timeout.as_secs(),
                    last_error,
                });
            }

            tracing::debug!(url = %self.url, error = %last_error, "Backend not ready yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
