//! JobGuard scoring server
//!
//! Loads trained fraud classifiers from the model directory and serves
//! predictions, model switching, health and metrics over HTTP.

use anyhow::Result;
use jobguard_server::{api, ServiceConfig};
use scoring_lib::{observability::StructuredLogger, ArtifactStore, ScoringService};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting jobguard-server");

    let config = ServiceConfig::load()?;
    info!(
        port = config.port,
        model_dir = %config.model_dir,
        default_model = %config.default_model,
        "Service configured"
    );

    let store = ArtifactStore::new(&config.model_dir);
    if !store.exists() {
        warn!(model_dir = %config.model_dir, "Model directory does not exist");
    }

    let service = Arc::new(ScoringService::new(store, config.default_model.clone()));

    // The service still starts without its default model; health reports it.
    if let Err(e) = service.warm_up().await {
        warn!(
            model = %config.default_model,
            error = %e,
            "Default model could not be loaded at startup"
        );
    }

    let logger = StructuredLogger::new("jobguard");
    logger.log_startup(SERVICE_VERSION, &config.model_dir, &config.default_model);

    let app_state = Arc::new(api::AppState::new(service.clone()));

    api::serve(config.port, app_state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    let stats = service.inference_stats();
    info!(
        total_inferences = stats.total_inferences,
        slow_inferences = stats.slow_inferences,
        "Shutting down"
    );

    Ok(())
}
