//! Configuration management for the delay pipeline

use crate::models::logistic::LogisticParams;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Serving model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path of the persisted model artifact
    pub path: String,
    /// Load the artifact at startup; otherwise serve the unfitted default
    #[serde(default)]
    pub load_on_startup: bool,
}

/// Offline training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Historical flights CSV
    pub data_path: String,
    /// Where the fitted artifact is written
    pub output_path: String,
    /// Inverse regularization strength
    #[serde(default = "default_regularization")]
    pub regularization: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

fn default_regularization() -> f64 {
    1.0
}

fn default_max_iter() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_random_state() -> u64 {
    1
}

impl TrainingConfig {
    /// Solver parameters for the classifier
    pub fn logistic_params(&self) -> LogisticParams {
        LogisticParams {
            regularization: self.regularization,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            random_state: self.random_state,
        }
    }
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between summary log lines (0 disables the reporter)
    pub report_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from `DELAY_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("DELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path.
    ///
    /// Values from the file are overridden by `DELAY_<SECTION>__<KEY>`
    /// environment variables, then by `LOAD_MODEL` and `MODEL_PATH`.
    /// Keys the file omits keep their defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("Configuration file {} not found", path.display());
        }
        Self::layered(Some(path))
            .with_context(|| format!("Failed to load configuration {}", path.display()))
    }

    /// Resolve the configuration for a command line run.
    ///
    /// A path given on the command line or in `DELAY_CONFIG` must exist.
    /// Otherwise the default path is used when present, falling back to the
    /// built-in defaults with environment overrides applied.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        if let Ok(path) = std::env::var("DELAY_CONFIG") {
            return Self::load_from_path(path);
        }

        if Path::new(DEFAULT_CONFIG_PATH).is_file() {
            Self::load_from_path(DEFAULT_CONFIG_PATH)
        } else {
            Self::layered(None).context("Failed to build default configuration")
        }
    }

    fn layered(file: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&AppConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("DELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "model.load_on_startup",
                std::env::var("LOAD_MODEL").ok().map(|v| parse_flag(&v)),
            )
            .context("Failed to apply LOAD_MODEL override")?
            .set_override_option("model.path", std::env::var("MODEL_PATH").ok())
            .context("Failed to apply MODEL_PATH override")?
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `1`, `true` and `yes` (any case) enable a flag; anything else disables it.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            model: ModelConfig {
                path: "artifacts/model.json".to_string(),
                load_on_startup: false,
            },
            training: TrainingConfig {
                data_path: "data/data.csv".to_string(),
                output_path: "artifacts/model.json".to_string(),
                regularization: default_regularization(),
                max_iter: default_max_iter(),
                tolerance: default_tolerance(),
                random_state: default_random_state(),
            },
            metrics: MetricsConfig {
                report_interval_secs: 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
