//! Request handlers

pub mod analyze;
pub mod health;
pub mod home;
pub mod predict;
pub mod train;

use axum::Json;
use serde::Serialize;

/// Success envelope; failures render through `AppError` as
/// `{ "success": false, "error": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}
