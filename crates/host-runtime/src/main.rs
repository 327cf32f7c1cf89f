//! # Domain Host
//!
//! Entry point: initialize telemetry, start the host, print the domain table
//! as JSON, then run until Ctrl+C. The final metrics snapshot is printed in
//! Prometheus text format on the way out.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (environment)
//! 2. Initialize logging and metrics
//! 3. Create the default domain and the configured plugin domains
//! 4. Signal ready

use anyhow::{Context, Result};
use domain_telemetry::{encode_metrics, init_telemetry};
use host_runtime::{HostConfig, HostRuntime};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = HostConfig::from_env().context("Invalid host configuration")?;
    let telemetry = init_telemetry(config.telemetry.clone())?;

    info!("===========================================");
    info!("  Domain Host v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let mut runtime = HostRuntime::new(config)?;
    runtime.start()?;

    println!("{}", serde_json::to_string_pretty(&runtime.summaries())?);

    info!("Host is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown();

    if telemetry.metrics_enabled() {
        print!("{}", encode_metrics()?);
    }
    Ok(())
}
