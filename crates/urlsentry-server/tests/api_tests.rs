//! HTTP API integration tests
//!
//! Drives the router in-process with the sample model artifact.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use urlsentry_core::{extract, Classifier, Estimator, Label, Tree};
use urlsentry_server::{create_router, http::LIVENESS_MESSAGE, AppState};

fn sample_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../models/malicious_url_model.json")
}

fn sample_state() -> Arc<AppState> {
    Arc::new(AppState::load(sample_model_path()).unwrap())
}

fn app() -> Router {
    create_router(sample_state())
}

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// === Liveness ===

#[tokio::test]
async fn test_home() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, json) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], LIVENESS_MESSAGE);
}

// === Predictions ===

#[tokio::test]
async fn test_predict_shortened_login_link() {
    let (status, json) = send(
        app(),
        predict_request(r#"{"url": "http://bit.ly/login-update"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], "http://bit.ly/login-update");
    assert_eq!(json["prediction"], "Malicious");
}

#[tokio::test]
async fn test_predict_plain_url() {
    let (status, json) = send(app(), predict_request(r#"{"url": "http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], "Safe");
}

#[tokio::test]
async fn test_predict_ip_literal() {
    let (status, json) = send(
        app(),
        predict_request(r#"{"url": "http://192.168.1.1/page"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], "Malicious");
}

#[tokio::test]
async fn test_prediction_matches_classifier() {
    let state = sample_state();
    let urls = [
        "http://bit.ly/login-update",
        "https://www.example.com/docs/index.html",
        "http://user@evil.example/a//b?x=1",
        "example.com",
    ];

    for url in urls {
        let expected = state
            .classifier
            .predict_features(&extract(url))
            .unwrap();
        let body = serde_json::json!({ "url": url }).to_string();
        let (status, json) = send(create_router(state.clone()), predict_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prediction"], expected.as_str(), "url: {}", url);
    }
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let router = app();
    let body = r#"{"url": "http://bit.ly/login-update"}"#;

    let (_, first) = send(router.clone(), predict_request(body)).await;
    for _ in 0..5 {
        let (status, json) = send(router.clone(), predict_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, first);
    }
}

#[tokio::test]
async fn test_missing_url_defaults_to_empty() {
    let (status, json) = send(app(), predict_request("{}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], "");
    assert_eq!(json["prediction"], "Safe");
}

// === Errors ===

#[tokio::test]
async fn test_malformed_json_is_500() {
    let (status, json) = send(app(), predict_request("{\"url\": ")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("Invalid JSON"));
}

#[tokio::test]
async fn test_non_json_content_type_is_500() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"url": "http://x.io"}"#))
        .unwrap();
    let (status, json) = send(app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported media type"));
}

#[tokio::test]
async fn test_missing_content_type_is_500() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .body(Body::from(r#"{"url": "http://example.com"}"#))
        .unwrap();
    let (status, json) = send(app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_json_content_type_with_charset() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"url": "http://example.com"}"#))
        .unwrap();
    let (status, json) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction"], "Safe");
}

#[tokio::test]
async fn test_non_object_body_is_500() {
    let (status, json) = send(app(), predict_request(r#""http://bit.ly""#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_non_string_url_is_500() {
    let (status, json) = send(app(), predict_request(r#"{"url": ["a", "b"]}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Field 'url' must be a string");
}

#[tokio::test]
async fn test_inference_failure_is_500() {
    // Leaf classes that do not map to a label
    let classifier = Classifier {
        n_features: 21,
        classes: vec![0, 9],
        estimator: Estimator::DecisionTree(Tree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![0.0, 1.0]],
        }),
    };
    let router = create_router(Arc::new(AppState::new(classifier).unwrap()));
    let (status, json) = send(router, predict_request(r#"{"url": "http://x.io"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("Unknown class"));
}

#[tokio::test]
async fn test_predict_requires_post() {
    let request = Request::builder()
        .uri("/api/predict")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// === CORS ===

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .header(header::ORIGIN, "https://frontend.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"url": "http://example.com"}"#))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

// === Startup ===

#[test]
fn test_missing_model_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    assert!(AppState::load(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_unvalidated_classifier_rejected() {
    // Split points back at the root, which would never terminate
    let classifier = Classifier {
        n_features: 21,
        classes: vec![0, 1],
        estimator: Estimator::DecisionTree(Tree {
            children_left: vec![0, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![7, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        }),
    };
    assert!(AppState::new(classifier).is_err());

    let out_of_range = Classifier {
        n_features: 21,
        classes: vec![0, 1],
        estimator: Estimator::DecisionTree(Tree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![40, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        }),
    };
    assert!(AppState::new(out_of_range).is_err());
}

#[test]
fn test_sample_model_labels() {
    let state = sample_state();
    let label = state
        .classifier
        .predict_features(&extract("http://bit.ly/xyz"))
        .unwrap();
    assert_eq!(label, Label::Malicious);
}
