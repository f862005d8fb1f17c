//! End-to-end API tests: synthetic dataset -> train -> routes

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use churnwatch::{create_router, AppState, ChurnPredictor};

fn write_dataset(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("customer_churn_data.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "customer_id,engagement_momentum,behavioral_drift,silence_index,response_degradation,session_decay_rate,consistency_score,churn"
    )
    .unwrap();
    for i in 0..rows {
        let churned = i % 3 == 0;
        let noise = ((i * 31) % 9) as f64 - 4.0;
        let f = if churned {
            [-45.0 + noise, 65.0 + noise, 13.0, 150.0 + noise, 48.0, 20.0 + noise]
        } else {
            [15.0 + noise, 12.0 + noise, 2.0, 35.0 + noise, 8.0, 82.0 + noise]
        };
        writeln!(
            file,
            "CUST_{i:04},{},{},{},{},{},{},{}",
            f[0],
            f[1],
            f[2],
            f[3],
            f[4],
            f[5],
            u8::from(churned)
        )
        .unwrap();
    }
    path
}

fn app(dir: &TempDir, trained: bool) -> Router {
    let dataset_path = write_dataset(dir.path(), 60);
    let predictor = Arc::new(ChurnPredictor::new(dataset_path, dir.path()));
    if trained {
        predictor.train().unwrap();
    }
    create_router(AppState { predictor })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn train_endpoint_returns_summary() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, false);

    let (status, body) = send(app, post_json("/train", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["features"][0], "engagement_momentum");
    assert!(body["data"]["train_accuracy"].as_f64().unwrap() <= 100.0);
    assert!(body["data"]["test_accuracy"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn predict_endpoint_scores_a_customer() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, true);

    let (status, body) = send(
        app,
        post_json(
            "/predict",
            json!({
                "engagement_momentum": -45.0,
                "behavioral_drift": 65.0,
                "silence_index": 13.0,
                "response_degradation": 150.0,
                "session_decay_rate": 48.0,
                "consistency_score": 20.0
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let data = &body["data"];
    let probability = data["churn_probability"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&probability));
    assert_eq!(data["risk_category"], "High");
    assert_eq!(data["risk_color"], "#ef4444");
    assert!(data["recommendation"].as_str().unwrap().starts_with("URGENT:"));
    assert!(data["risk_factors"].as_array().unwrap().len() <= 3);
    // serialized factors expose display name, value and importance
    let factor = &data["risk_factors"][0];
    assert!(factor["feature"].as_str().unwrap().contains(' '));
    assert!(factor["importance"].as_f64().is_some());
}

#[tokio::test]
async fn predict_rejects_incomplete_features() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, true);

    let (status, body) = send(
        app,
        post_json("/predict", json!({ "engagement_momentum": -45.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("consistency_score"));
}

#[tokio::test]
async fn analyze_endpoint_pairs_predictions_with_labels() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, true);

    let (status, body) = send(app, get("/analyze_dataset?limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["customer_id"], "CUST_0000");
    assert_eq!(rows[0]["actual_churn"], 1);
    assert_eq!(rows[1]["actual_churn"], 0);
    for row in rows {
        let p = row["churn_probability"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&p));
    }
}

#[tokio::test]
async fn analyze_defaults_to_fifty_rows() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, true);

    let (status, body) = send(app, get("/analyze_dataset")).await;
    assert_eq!(status, StatusCode::OK);
    // dataset has 60 rows, default limit is 50
    assert_eq!(body["data"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn home_and_health_respond() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, true);

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], json!(true));
}

#[tokio::test]
async fn failed_request_does_not_poison_the_service() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, true);

    let (status, _) = send(app.clone(), post_json("/predict", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the model snapshot is untouched, a valid request still works
    let (status, body) = send(
        app,
        post_json(
            "/predict",
            json!({
                "engagement_momentum": 15.0,
                "behavioral_drift": 12.0,
                "silence_index": 2.0,
                "response_degradation": 35.0,
                "session_decay_rate": 8.0,
                "consistency_score": 82.0
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["risk_category"], "Low");
}
