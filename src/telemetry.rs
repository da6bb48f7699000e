//! Tracing subscriber setup

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies to
/// this crate and `tower_http`.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "flight_delay_pipeline={level},flight_delay_server={level},train={level},tower_http={level}",
            level = logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match logging.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}
