//! Churnwatch: silent customer churn prediction service.
//!
//! Six precomputed behavioral signals per customer feed a class-balanced
//! random forest; predictions come back with a risk category, ranked risk
//! factors and a retention recommendation, served over a small axum API.

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod handlers;
pub mod model;
pub mod predictor;
pub mod recommend;
pub mod scoring;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use predictor::ChurnPredictor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<ChurnPredictor>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home::index))
        .route("/health", get(handlers::health::check))
        .route("/train", post(handlers::train::run))
        .route("/predict", post(handlers::predict::run))
        .route("/analyze_dataset", get(handlers::analyze::run))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
