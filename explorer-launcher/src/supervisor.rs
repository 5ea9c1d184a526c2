//! Starts the backend, waits for it, starts the frontend and keeps both
//! running until they exit or the operator interrupts.

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::process::ManagedProcess;
use crate::readiness::ReadinessProbe;
use std::future::Future;
use std::process::ExitStatus;

pub const SHUTDOWN_NOTICE: &str = "Shutting down services...";

enum Startup {
    Ready(Result<(), LaunchError>),
    Exited(Result<ExitStatus, LaunchError>),
    Interrupted,
}

pub struct Launcher {
    config: LauncherConfig,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Run both processes until they exit or `shutdown` resolves.
    ///
    /// Interrupts are not errors: both children are stopped and `Ok` is
    /// returned.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), LaunchError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let probe = if self.config.readiness.is_enabled() {
            Some(ReadinessProbe::new(&self.config.readiness)?)
        } else {
            None
        };

        let mut backend = ManagedProcess::spawn(&self.config.backend)?;

        let startup = tokio::select! {
            result = self.wait_for_backend(probe.as_ref()) => Startup::Ready(result),
            status = backend.wait() => Startup::Exited(status),
            _ = &mut shutdown => Startup::Interrupted,
        };

        match startup {
            Startup::Ready(Ok(())) => {}
            Startup::Ready(Err(e)) => {
                tracing::error!(error = %e, "Backend did not become ready");
                self.stop(&mut backend).await;
                return Err(e);
            }
            Startup::Exited(Ok(status)) => {
                self.stop(&mut backend).await;
                return Err(LaunchError::ExitedEarly {
                    name: backend.name().to_string(),
                    status,
                });
            }
            Startup::Exited(Err(e)) => {
                self.stop(&mut backend).await;
                return Err(e);
            }
            Startup::Interrupted => {
                println!("{}", SHUTDOWN_NOTICE);
                self.stop(&mut backend).await;
                return Ok(());
            }
        }

        let mut frontend = match ManagedProcess::spawn(&self.config.frontend) {
            Ok(process) => process,
            Err(e) => {
                tracing::error!(error = %e, "Frontend failed to start");
                self.stop(&mut backend).await;
                return Err(e);
            }
        };

        let mut backend_done = false;
        let mut frontend_done = false;

        while !(backend_done && frontend_done) {
            tokio::select! {
                result = backend.wait(), if !backend_done => {
                    backend_done = true;
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Lost track of backend");
                    }
                }
                result = frontend.wait(), if !frontend_done => {
                    frontend_done = true;
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Lost track of frontend");
                    }
                }
                _ = &mut shutdown => {
                    println!("{}", SHUTDOWN_NOTICE);
                    tokio::join!(self.stop(&mut frontend), self.stop(&mut backend));
                    return Ok(());
                }
            }
        }

        tracing::info!("All services exited");
        Ok(())
    }

    async fn wait_for_backend(&self, probe: Option<&ReadinessProbe>) -> Result<(), LaunchError> {
        match probe {
            Some(probe) => probe.wait_until_ready().await,
            None => {
                tracing::info!(
                    delay_ms = self.config.startup_delay_ms,
                    "No readiness URL configured, waiting a fixed delay"
                );
                tokio::time::sleep(self.config.startup_delay()).await;
                Ok(())
            }
        }
    }

    async fn stop(&self, process: &mut ManagedProcess) {
        if let Err(e) = process.terminate(self.config.shutdown_grace()).await {
            tracing::error!(name = %process.name(), error = %e, "Failed to stop process");
        }
    }
}
