//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Dataset problems: missing file, missing columns, unreadable rows
    #[error("dataset error: {0}")]
    Data(String),

    /// Inference requested before any model was trained or loaded
    #[error("no model available: train a model or provide persisted artifacts")]
    ModelNotReady,

    /// Request payload violates the feature contract
    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Data(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<polars::prelude::PolarsError> for AppError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        AppError::Data(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ndarray::ShapeError> for AppError {
    fn from(err: ndarray::ShapeError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::model::ModelError> for AppError {
    fn from(err: crate::model::ModelError) -> Self {
        AppError::Data(err.to_string())
    }
}
