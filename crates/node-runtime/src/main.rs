//! # Quantum-Chain Deliver Node
//!
//! Serves channel blocks to clients over the deliver protocol.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults overlaid with `QC_*` environment variables)
//! 2. Create every configured channel from its genesis block
//! 3. Bind the deliver listener and accept sessions
//! 4. On Ctrl+C, stop accepting and close open sessions

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::{NodeConfig, NodeRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = NodeConfig::from_env();

    let mut runtime = NodeRuntime::new(config).context("failed to initialize node")?;
    let addr = runtime
        .start()
        .await
        .context("failed to start deliver server")?;

    info!(%addr, "Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
