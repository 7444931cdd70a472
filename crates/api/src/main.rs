//! Prediction API Server - Main Entry Point

use anyhow::Context;
use api::settings::Settings;
use api::{init_logging, run_server};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "capstone-server", version, about = "Serve the manufacturing and heart disease predictors")]
struct Args {
    /// Settings file layered over config/default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the settings
    #[arg(short, long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    if let Some(addr) = args.addr {
        settings.server.addr = addr;
    }

    init_logging(&settings.logging)?;
    info!("=== Capstone Predictors v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(settings).await?;
    Ok(())
}
