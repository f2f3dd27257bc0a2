//! DSMCost batch binary
//!
//! Logs to stderr, prints the JSON report to stdout.

use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dsmcost_cli::{BatchRunner, SimulatorConfig};
use dsmcost_common::VERSION;
use dsmcost_engine::EngineMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting DSMCost v{}", VERSION);

    // Load configuration
    let config = SimulatorConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let registry = Registry::new();
    let metrics = Arc::new(EngineMetrics::new()?);
    metrics.register(&registry)?;

    let runner = BatchRunner::new(config, metrics)?;
    let report = runner.execute().await?;

    if let Some(adj) = report.degree_adjustment {
        info!(
            "Dependency degree adjusted from {} to {}",
            adj.requested, adj.effective
        );
    }
    if let Some(cleared) = report.history_reset {
        info!(
            "Run history cleared after {} runs; resubmit parameters to continue",
            cleared
        );
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    debug!("Metrics:\n{}", String::from_utf8_lossy(&buffer));

    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Completed {} retained runs", report.runs.len());
    Ok(())
}
