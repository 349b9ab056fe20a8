//! urlsentry server - Malicious URL detection API
//!
//! HTTP front end for [`urlsentry_core`]: extracts features from a posted URL
//! and returns the classifier's verdict.

pub mod config;
pub mod http;

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use urlsentry_core::{Classifier, ModelError};

pub use config::{ConfigError, ServerConfig};

/// Shared application state
///
/// Built once at startup and never mutated, so handlers read it without locks.
pub struct AppState {
    pub classifier: Classifier,
}

impl AppState {
    /// Create from a classifier, rejecting one that could fail mid-request
    pub fn new(classifier: Classifier) -> Result<Self, ModelError> {
        classifier.validate()?;
        Ok(Self { classifier })
    }

    /// Create with the classifier loaded from a model artifact
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::new(Classifier::load(model_path)?)
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::home))
        .route("/api/predict", post(http::predict))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("urlsentry server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
