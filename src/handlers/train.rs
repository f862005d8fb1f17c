//! Training handler

use axum::extract::State;
use axum::Json;

use super::{ok, ApiResponse};
use crate::predictor::TrainingSummary;
use crate::{AppError, AppResult, AppState};

/// `POST /train`: retrain from the configured dataset and swap the serving
/// model. Training is CPU-bound, so it runs on the blocking pool.
pub async fn run(State(state): State<AppState>) -> AppResult<Json<ApiResponse<TrainingSummary>>> {
    let predictor = state.predictor.clone();
    let summary = tokio::task::spawn_blocking(move || predictor.train())
        .await
        .map_err(|e| AppError::Internal(format!("training task failed: {e}")))??;

    Ok(ok(summary))
}
