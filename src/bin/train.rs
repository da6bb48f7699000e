//! Offline training entry point
//!
//! Reads historical flights, fits the delay classifier and writes the model
//! artifact loaded by the server.

use anyhow::{Context, Result};
use clap::Parser;
use flight_delay_pipeline::{
    config::AppConfig,
    models::save_classifier,
    telemetry,
    training::train_from_csv,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Fit the flight delay classifier from historical data", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $DELAY_CONFIG or config/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Training CSV (overrides training.data_path)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Artifact output path (overrides training.output_path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the training report as JSON on stdout
    #[arg(long)]
    report_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref())?;
    telemetry::init_tracing(&config.logging)?;

    let data = cli
        .data
        .unwrap_or_else(|| PathBuf::from(&config.training.data_path));
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.training.output_path));

    info!(data = %data.display(), output = %output.display(), "Starting training run");

    let outcome = train_from_csv(&data, &config.training)?;
    let artifact = save_classifier(&outcome.classifier, &output)
        .with_context(|| format!("Failed to write artifact {}", output.display()))?;

    info!(
        model_id = %artifact.model_id,
        samples = outcome.report.samples,
        "Model written"
    );

    if cli.report_json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    }

    Ok(())
}
