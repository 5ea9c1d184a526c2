//! explorer-launcher: supervises the expression service and the frontend
//! dev server as child processes.
pub mod config;
pub mod error;
pub mod process;
pub mod readiness;
pub mod supervisor;

pub use config::{LauncherConfig, ProcessSpec, ReadinessConfig};
pub use error::LaunchError;
pub use process::ManagedProcess;
pub use readiness::ReadinessProbe;
pub use supervisor::Launcher;
