//! HTTP contract tests, driving the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use flight_delay_pipeline::models::{
    ClassWeights, DelayClassifier, FittedClassifier, LogisticModel, LogisticParams,
};
use flight_delay_pipeline::server::{router, AppState};
use flight_delay_pipeline::{PredictionService, FEATURE_COUNT};
use ndarray::Array1;
use serde_json::{json, Value};
use tower::ServiceExt;

fn unfitted_app() -> Router {
    router(AppState::new(PredictionService::unfitted()))
}

/// Predicts a delay for international flights only.
fn international_app() -> Router {
    let mut coefficients = Array1::zeros(FEATURE_COUNT);
    coefficients[5] = 3.0;
    let classifier = DelayClassifier::Ready(FittedClassifier {
        model: LogisticModel {
            coefficients,
            intercept: -1.5,
        },
        class_weights: ClassWeights {
            negative: 0.2,
            positive: 0.8,
        },
        params: LogisticParams::default(),
        training_samples: 100,
    });
    router(AppState::new(PredictionService::with_fitted(classifier)))
}

async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(unfitted_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn test_unfitted_predicts_no_delay() {
    let (status, body) = post_json(
        unfitted_app(),
        r#"{"flights":[{"OPERA":"Aerolineas Argentinas","TIPOVUELO":"N","MES":1}]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predict": [0]}));
}

#[tokio::test]
async fn test_empty_batch() {
    let (status, body) = post_json(unfitted_app(), r#"{"flights":[]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predict": []}));
}

#[tokio::test]
async fn test_fitted_predictions_keep_input_order() {
    let payload = json!({"flights": [
        {"OPERA": "Grupo LATAM", "TIPOVUELO": "N", "MES": 3},
        {"OPERA": "Grupo LATAM", "TIPOVUELO": "I", "MES": 3},
        {"OPERA": "Aerolineas Argentinas", "TIPOVUELO": "N", "MES": 7},
        {"OPERA": "Aerolineas Argentinas", "TIPOVUELO": "I", "MES": 12},
    ]});

    let (status, body) = post_json(international_app(), &payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predict": [0, 1, 0, 1]}));
}

#[tokio::test]
async fn test_unknown_airline_rejects_whole_batch() {
    let payload = json!({"flights": [
        {"OPERA": "Grupo LATAM", "TIPOVUELO": "I", "MES": 3},
        {"OPERA": "Unknown Air", "TIPOVUELO": "N", "MES": 5},
    ]});

    let (status, body) = post_json(international_app(), &payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("predict").is_none());
    assert!(body["detail"].as_str().unwrap().contains("OPERA"));
}

#[tokio::test]
async fn test_invalid_fields_are_rejected() {
    let cases = [
        r#"{"flights":[{"OPERA":"Aerolineas Argentinas","TIPOVUELO":"N","MES":13}]}"#,
        r#"{"flights":[{"OPERA":"Aerolineas Argentinas","TIPOVUELO":"O","MES":13}]}"#,
        r#"{"flights":[{"OPERA":"Argentinas","TIPOVUELO":"O","MES":13}]}"#,
        r#"{"flights":[{"OPERA":"Aerolineas Argentinas","TIPOVUELO":"N","MES":"1"}]}"#,
        r#"{"flights":{"OPERA":"Aerolineas Argentinas"}}"#,
        r#"{"vuelos":[]}"#,
        r#"[1,2,3]"#,
        r#"{"flights": [1]}"#,
    ];

    for body in cases {
        let (status, _) = post_json(unfitted_app(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {} should be rejected", body);
    }
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (status, body) = post_json(unfitted_app(), r#"{"flights": ["#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_model_status_endpoint() {
    let (status, body) = get_json(unfitted_app(), "/model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"state": "unfitted"}));

    let (_, body) = get_json(international_app(), "/model").await;
    assert_eq!(body, json!({"state": "fitted"}));

    let service = PredictionService::load_or_unfitted("/nonexistent/model.json");
    let (_, body) = get_json(router(AppState::new(service)), "/model").await;
    assert_eq!(body["state"], "load_failed");
    assert_eq!(body["path"], "/nonexistent/model.json");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let state = AppState::new(PredictionService::unfitted());
    let app = router(state.clone());

    post_json(
        app.clone(),
        r#"{"flights":[{"OPERA":"Grupo LATAM","TIPOVUELO":"N","MES":2},{"OPERA":"Grupo LATAM","TIPOVUELO":"I","MES":4}]}"#,
    )
    .await;
    post_json(app.clone(), r#"{"flights":[{"OPERA":"Nope","TIPOVUELO":"N","MES":2}]}"#).await;

    let (status, body) = get_json(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests_served"], 1);
    assert_eq!(body["requests_rejected"], 1);
    assert_eq!(body["flights_scored"], 2);
    assert_eq!(body["delays_predicted"], 0);
}
