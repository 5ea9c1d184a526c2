//! Child process handles with process-group termination.

use crate::config::ProcessSpec;
use crate::error::LaunchError;
#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;

#[cfg(unix)]
const GROUP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A supervised child process.
///
/// On unix the child leads its own process group, so termination reaches
/// anything it spawned (`cargo run` and `npm start` both fork the real
/// server).
pub struct ManagedProcess {
    name: String,
    pid: Option<u32>,
    child: Child,
    exit_status: Option<ExitStatus>,
}

impl ManagedProcess {
    pub fn spawn(spec: &ProcessSpec) -> Result<Self, LaunchError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(
            name = %spec.name,
            command = %spec.display(),
            working_dir = %spec.working_dir.display(),
            "Spawning process"
        );

        let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            name: spec.name.clone(),
            program: spec.program.clone(),
            source,
        })?;
        let pid = child.id();

        tracing::info!(name = %spec.name, pid = ?pid, command = %spec.display(), "Started process");

        Ok(Self {
            name: spec.name.clone(),
            pid,
            child,
            exit_status: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the process to exit. Safe to call again after it has.
    pub async fn wait(&mut self) -> Result<ExitStatus, LaunchError> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }

        let status = self.child.wait().await.map_err(|source| LaunchError::Wait {
            name: self.name.clone(),
            source,
        })?;
        self.record_exit(status);
        Ok(status)
    }

    /// Ask the process group to stop, then force-kill whatever is left of it
    /// once `grace` runs out. The group is signalled even when the leader has
    /// already exited, since servers it started may still be running.
    pub async fn terminate(&mut self, grace: Duration) -> Result<ExitStatus, LaunchError> {
        let deadline = Instant::now() + grace;

        #[cfg(unix)]
        self.signal_group(Signal::SIGTERM);

        #[cfg(not(unix))]
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(name = %self.name, error = %e, "Kill failed");
        }

        let status = match tokio::time::timeout_at(deadline, self.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    name = %self.name,
                    grace_secs = grace.as_secs_f64(),
                    "Process ignored termination request, killing"
                );

                #[cfg(unix)]
                self.signal_group(Signal::SIGKILL);

                if let Err(e) = self.child.start_kill() {
                    tracing::debug!(name = %self.name, error = %e, "Kill after group signal failed");
                }
                self.wait().await?
            }
        };

        #[cfg(unix)]
        self.drain_group(deadline).await;

        Ok(status)
    }

    #[cfg(unix)]
    fn pgid(&self) -> Option<Pid> {
        self.pid
            .and_then(|pid| i32::try_from(pid).ok())
            .map(Pid::from_raw)
    }

    #[cfg(unix)]
    fn group_alive(&self) -> bool {
        self.pgid().is_some_and(|pgid| killpg(pgid, None).is_ok())
    }

    /// Wait for the rest of the group to exit, killing it at `deadline`.
    #[cfg(unix)]
    async fn drain_group(&self, deadline: Instant) {
        while self.group_alive() {
            if Instant::now() >= deadline {
                tracing::warn!(name = %self.name, "Process group outlived grace period, killing");
                self.signal_group(Signal::SIGKILL);
                return;
            }
            tokio::time::sleep(GROUP_POLL_INTERVAL).await;
        }
    }

    #[cfg(unix)]
    fn signal_group(&self, signal: Signal) {
        let Some(pgid) = self.pgid() else {
            return;
        };

        match killpg(pgid, signal) {
            Ok(()) => {
                tracing::debug!(name = %self.name, %pgid, %signal, "Signalled process group");
            }
            Err(Errno::ESRCH) => {
                tracing::debug!(name = %self.name, %pgid, %signal, "Process group already gone");
            }
            Err(e) => {
                tracing::warn!(name = %self.name, %pgid, %signal, error = %e, "Failed to signal process group");
            }
        }
    }

    fn record_exit(&mut self, status: ExitStatus) {
        tracing::info!(name = %self.name, pid = ?self.pid, %status, "Process exited");
        self.exit_status = Some(status);
    }
}
