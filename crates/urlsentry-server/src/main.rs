//! urlsentry server binary

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use urlsentry_server::{serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ServerConfig::load().inspect_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
    })?;

    // No model, no service
    let state = AppState::load(&config.model_path).inspect_err(|e| {
        tracing::error!("Failed to load model {:?}: {}", config.model_path, e);
    })?;

    serve(&config.bind_addr(), Arc::new(state)).await
}
