//! # Mission Grid Node
//!
//! Entry point for a Mission Grid node.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + Prometheus registry)
//! 2. Load configuration from `MG_*` variables and validate it
//! 3. Build the service container in dependency order
//! 4. Start the notification handler and maintenance loop
//! 5. Wait for Ctrl+C, then shut down over the `watch` channel

use anyhow::{Context, Result};
use mission_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        config = %serde_json::to_string(&config).context("Failed to render configuration")?,
        "Configuration loaded"
    );

    let runtime = NodeRuntime::new(config).context("Failed to build services")?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
