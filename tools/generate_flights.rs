//! Synthetic Flight Generator
//!
//! Writes a CSV of historical-looking flights in the training format, for
//! exercising the training run without the real dataset.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use flight_delay_pipeline::labeler::TIMESTAMP_FORMAT;
use flight_delay_pipeline::TrainingRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::info;

/// Airlines with their base probability of a >15 minute delay
const AIRLINES: [(&str, f64); 8] = [
    ("Grupo LATAM", 0.20),
    ("Sky Airline", 0.18),
    ("Aerolineas Argentinas", 0.24),
    ("Copa Air", 0.08),
    ("Latin American Wings", 0.40),
    ("Latin Air Argentina", 0.15),
    ("JetSmart SPA", 0.15),
    ("American Airlines", 0.12),
];

#[derive(Parser)]
#[command(name = "generate_flights")]
#[command(about = "Generate a synthetic flight history CSV", long_about = None)]
struct Cli {
    /// Output CSV path
    #[arg(short, long, default_value = "data/data.csv")]
    output: PathBuf,

    /// Number of flights
    #[arg(short, long, default_value_t = 10_000)]
    count: usize,

    /// RNG seed
    #[arg(short, long, default_value_t = 1)]
    seed: u64,
}

/// Flight generator with a fixed seed
struct FlightGenerator {
    rng: StdRng,
}

impl FlightGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn generate(&mut self) -> Result<TrainingRecord> {
        let (opera, base_rate) = AIRLINES[self.rng.gen_range(0..AIRLINES.len())];
        let international = self.rng.gen_bool(0.45);
        let mes: u32 = self.rng.gen_range(1..=12);

        // Peak season and international routes run later.
        let mut delay_rate = base_rate;
        if matches!(mes, 7 | 10 | 11 | 12) {
            delay_rate += 0.08;
        }
        if international {
            delay_rate += 0.05;
        }

        let day = NaiveDate::from_ymd_opt(2017, mes, self.rng.gen_range(1..=28))
            .context("generated an invalid date")?;
        let scheduled: NaiveDateTime = day
            .and_hms_opt(self.rng.gen_range(0..24), self.rng.gen_range(0..60), 0)
            .context("generated an invalid time")?;

        let offset = if self.rng.gen_bool(delay_rate.min(1.0)) {
            self.rng.gen_range(16..180)
        } else {
            self.rng.gen_range(-10..=15)
        };
        let actual = scheduled + Duration::minutes(offset);

        Ok(TrainingRecord {
            fecha_i: scheduled.format(TIMESTAMP_FORMAT).to_string(),
            fecha_o: actual.format(TIMESTAMP_FORMAT).to_string(),
            opera: opera.to_string(),
            tipo_vuelo: if international { "I" } else { "N" }.to_string(),
            mes,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_flights=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!(count = cli.count, seed = cli.seed, output = %cli.output.display(), "Generating flights");

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let mut generator = FlightGenerator::new(cli.seed);

    for i in 0..cli.count {
        writer.serialize(generator.generate()?)?;
        if (i + 1) % 10_000 == 0 {
            info!("Generated {}/{} flights", i + 1, cli.count);
        }
    }
    writer.flush()?;

    info!(count = cli.count, "Completed");
    Ok(())
}
