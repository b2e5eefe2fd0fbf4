//! Purchase Prediction - Main Entry Point
//!
//! Loads the classifier and scaler once, then answers `<age> <salary>`
//! requests typed on stdin until `quit` or end of input.

use anyhow::Result;
use purchase_prediction::{
    config::{AppConfig, LogFormat, LoggingConfig},
    console,
    metrics::SessionMetrics,
    models::{inference::InferenceContext, loader::ArtifactLoader},
};
use std::io;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    info!("Starting purchase prediction session");

    let artifacts = ArtifactLoader::new(&config.artifacts).load();
    println!("{}", console::render_readiness(&artifacts.readiness));
    for err in artifacts.readiness.errors() {
        warn!(kind = err.kind(), error = %err, "Artifact unavailable");
    }

    let context = InferenceContext::from_artifacts(artifacts);
    let metrics = SessionMetrics::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = console::run_session(&context, &metrics, stdin.lock(), &mut stdout) {
        warn!(error = %e, "Session output failed");
    }

    metrics.log_summary();
    info!("Session ended");

    Ok(())
}
