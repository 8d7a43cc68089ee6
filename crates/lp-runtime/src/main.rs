//! # Lucky-Pool
//!
//! Serves the lucky money pool over HTTP until Ctrl+C.

use anyhow::Result;
use lp_runtime::{log_directive, LuckyPoolRuntime, RuntimeConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directive(|key| std::env::var(key).ok())))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("===========================================");
    info!("  Lucky-Pool v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = RuntimeConfig::from_env()?;
    let runtime = LuckyPoolRuntime::new(config)?;

    runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await?;

    Ok(())
}
