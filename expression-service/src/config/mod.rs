use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// NCBI GEO accession display endpoint; serves SOFT text with `form=text`.
const DEFAULT_GEO_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/geo/query/acc.cgi";
const DEFAULT_GEO_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 64;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub geo: GeoConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of datasets kept in memory. 0 disables retention.
    pub max_entries: usize,
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Empty means every origin is mirrored back with credentials allowed.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wide_open(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEO_BASE_URL.to_string(),
            timeout_secs: DEFAULT_GEO_TIMEOUT_SECS,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            geo: GeoConfig::default(),
            cache: CacheConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ExpressionConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ExpressionConfig {
            common: common_config,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            geo: GeoConfig {
                base_url: get_env("GEO_BASE_URL", Some(DEFAULT_GEO_BASE_URL), is_prod)?,
                timeout_secs: parse_env(
                    "GEO_TIMEOUT_SECS",
                    DEFAULT_GEO_TIMEOUT_SECS,
                    is_prod,
                )?,
            },
            cache: CacheConfig {
                max_entries: parse_env(
                    "DATASET_CACHE_MAX_ENTRIES",
                    DEFAULT_CACHE_MAX_ENTRIES,
                    is_prod,
                )?,
                ttl_secs: parse_env("DATASET_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS, is_prod)?,
            },
            cors: CorsConfig {
                allowed_origins: split_list(&get_env("CORS_ALLOWED_ORIGINS", Some(""), is_prod)?),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(&default.to_string()), is_prod)?;
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
