//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use urlsentry_core::{extract, Label, ModelError};

use crate::AppState;

/// Body of the liveness endpoint
pub const LIVENESS_MESSAGE: &str = "Malicious URL Detection API is running!";

/// Errors surfaced by the predict endpoint
///
/// Every variant is reported as `500 {"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unsupported media type {0:?}: expected 'application/json'")]
    UnsupportedMediaType(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Field 'url' must be a string")]
    UrlNotString,

    #[error("Prediction failed: {0}")]
    Model(#[from] ModelError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub url: String,
    pub prediction: Label,
}

/// Liveness probe
pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": LIVENESS_MESSAGE }))
}

/// Whether a `Content-Type` value names JSON
///
/// Accepts `application/json` and `application/*+json`, ignoring parameters
/// such as `charset` and letter case.
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Read the `url` field of a predict request body
///
/// The body must be declared as JSON. An absent `url` is treated as the empty
/// string. Anything that is not a JSON object, or a `url` that is not a
/// string, is rejected.
pub fn parse_predict_body(content_type: Option<&str>, body: &[u8]) -> Result<String, ApiError> {
    match content_type {
        Some(ct) if is_json_content_type(ct) => {}
        other => {
            return Err(ApiError::UnsupportedMediaType(
                other.unwrap_or("").to_string(),
            ))
        }
    }

    let value: serde_json::Value = serde_json::from_slice(body)?;
    let object = value.as_object().ok_or(ApiError::NotAnObject)?;

    match object.get("url") {
        None => Ok(String::new()),
        Some(serde_json::Value::String(url)) => Ok(url.clone()),
        Some(_) => Err(ApiError::UrlNotString),
    }
}

/// Extract features from `url` and classify them
pub fn classify(state: &AppState, url: String) -> Result<PredictResponse, ApiError> {
    let features = extract(&url);
    let prediction = state.classifier.predict_features(&features)?;
    tracing::debug!(?features, %prediction, "Classified {:?}", url);

    Ok(PredictResponse { url, prediction })
}

/// Classify the URL in the request body
pub async fn predict(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    parse_predict_body(content_type, &body)
        .and_then(|url| classify(&state, url))
        .map(Json)
        .inspect_err(|e| tracing::warn!("Prediction request failed: {}", e))
}
