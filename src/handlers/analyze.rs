//! Dataset analysis handler

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ok, ApiResponse};
use crate::predictor::CustomerAssessment;
use crate::{AppResult, AppState};

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub limit: Option<usize>,
}

/// `GET /analyze_dataset`: score the first rows of the training dataset and
/// pair each prediction with the row's ground-truth label.
pub async fn run(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> AppResult<Json<ApiResponse<Vec<CustomerAssessment>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let assessments = state.predictor.analyze(limit)?;
    Ok(ok(assessments))
}
