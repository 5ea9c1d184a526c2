use explorer_launcher::{Launcher, LauncherConfig};
use service_core::observability::init_tracing;
use service_core::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = LauncherConfig::load()?;
    init_tracing("explorer-launcher", &config.log_level, None);

    println!("Starting Gene Expression Explorer...");
    tracing::info!(
        backend = %config.backend.display(),
        frontend = %config.frontend.display(),
        "Launching services"
    );

    Launcher::new(config).run(shutdown_signal()).await?;
    Ok(())
}
