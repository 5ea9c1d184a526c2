use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to load launcher configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to start {name} ({program}): {source}")]
    Spawn {
        name: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait on {name}: {source}")]
    Wait {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} exited before becoming ready ({status})")]
    ExitedEarly { name: String, status: ExitStatus },

    #[error("{url} not ready after {timeout_secs}s: {last_error}")]
    NotReady {
        url: String,
        timeout_secs: u64,
        last_error: String,
    },

    #[error("Failed to build readiness client: {0}")]
    Client(#[from] reqwest::Error),
}
