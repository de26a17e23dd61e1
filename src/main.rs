//! Burnout Predictor - Main Entry Point
//!
//! `burnout train` builds the artifacts, `burnout serve` exposes them over HTTP.

use burnout_predictor::cli::{cmd_serve, cmd_train, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "burnout=info,burnout_predictor=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, output } => {
            cmd_train(&data, &output)?;
        }
        Commands::Serve { host, port, models_dir } => {
            cmd_serve(host, port, models_dir).await?;
        }
    }

    Ok(())
}
