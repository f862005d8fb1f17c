//! Prediction handler

use axum::extract::State;
use axum::Json;

use super::{ok, ApiResponse};
use crate::features::CustomerFeatures;
use crate::predictor::Prediction;
use crate::{AppResult, AppState};

/// `POST /predict`: score one customer record.
///
/// The body is checked against the six-key feature contract before anything
/// touches the model, so a malformed request cannot reach scoring.
pub async fn run(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<ApiResponse<Prediction>>> {
    let features = CustomerFeatures::from_value(&body)?;
    let prediction = state.predictor.predict(&features)?;
    Ok(ok(prediction))
}
