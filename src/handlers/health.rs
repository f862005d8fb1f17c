//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    model_trained_at: Option<chrono::DateTime<chrono::Utc>>,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.predictor.is_ready(),
        model_trained_at: state.predictor.trained_at(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
