//! The learned half of the service: feature scaler, random forest, and the
//! persistence layer that keeps the two on disk as a matched pair.

pub mod forest;
pub mod scaler;
pub mod store;
pub mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use scaler::StandardScaler;

/// Errors from fitting on degenerate training input
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training set contains a single class, cannot fit a classifier")]
    SingleClass,
}
