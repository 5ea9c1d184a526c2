//! Launcher settings.
//!
//! Loaded from an optional `launcher` file (any format the `config` crate
//! understands) and `LAUNCHER__*` environment variables, on top of defaults
//! that run the workspace backend and an npm frontend.

use crate::error::LaunchError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// One child process: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
}

impl ProcessSpec {
    pub fn new(name: &str, program: &str, args: &[&str], working_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            working_dir: working_dir.into(),
        }
    }

    /// Command line as typed in a shell, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadinessConfig {
    /// Health endpoint polled before the frontend starts. Empty disables
    /// polling in favour of `startup_delay_ms`.
    pub url: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl ReadinessConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/health".to_string(),
            poll_interval_ms: 250,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LauncherConfig {
    pub backend: ProcessSpec,
    pub frontend: ProcessSpec,
    pub readiness: ReadinessConfig,
    pub startup_delay_ms: u64,
    pub shutdown_grace_secs: u64,
    pub log_level: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            backend: ProcessSpec::new("backend", "cargo", &["run", "-p", "expression-service"], "."),
            frontend: ProcessSpec::new("frontend", "npm", &["start"], "frontend"),
            readiness: ReadinessConfig::default(),
            startup_delay_ms: 2000,
            shutdown_grace_secs: 5,
            log_level: "info".to_string(),
        }
    }
}

impl LauncherConfig {
    pub fn load() -> Result<Self, LaunchError> {
        let defaults = Self::default();
        let mut builder = Cfg::builder();

        for (key, spec) in [("backend", &defaults.backend), ("frontend", &defaults.frontend)] {
            builder = builder
                .set_default(format!("{}.name", key), spec.name.clone())?
                .set_default(format!("{}.program", key), spec.program.clone())?
                .set_default(format!("{}.args", key), spec.args.clone())?
                .set_default(
                    format!("{}.working_dir", key),
                    spec.working_dir.to_string_lossy().into_owned(),
                )?;
        }

        let config = builder
            .set_default("readiness.url", defaults.readiness.url)?
            .set_default("readiness.poll_interval_ms", defaults.readiness.poll_interval_ms)?
            .set_default("readiness.timeout_secs", defaults.readiness.timeout_secs)?
            .set_default("startup_delay_ms", defaults.startup_delay_ms)?
            .set_default("shutdown_grace_secs", defaults.shutdown_grace_secs)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name("launcher").required(false))
            .add_source(
                Environment::with_prefix("LAUNCHER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("backend.args")
                    .with_list_parse_key("frontend.args"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
