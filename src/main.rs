//! Flight Delay Server - Main Entry Point
//!
//! Loads the configured model (or serves the unfitted default) and exposes
//! the scoring API over HTTP.

use anyhow::{Context, Result};
use flight_delay_pipeline::{
    config::AppConfig,
    feature_encoder::FEATURE_COLUMNS,
    metrics::MetricsReporter,
    server::{router, AppState},
    service::PredictionService,
    telemetry,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.logging)?;

    info!("Starting Flight Delay Server");
    info!(
        features = FEATURE_COLUMNS.len(),
        columns = ?FEATURE_COLUMNS,
        "Feature contract"
    );

    // The service is fully built before the listener accepts requests.
    let service = PredictionService::from_config(&config.model);
    info!(status = ?service.status(), "Prediction service ready");

    let state = AppState::new(service);

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(state.metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let app = router(state.clone());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    state.metrics.log_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
