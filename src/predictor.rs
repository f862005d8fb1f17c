//! Model lifecycle and scoring service.
//!
//! Owns the (forest, scaler) pair behind an immutable snapshot: inference
//! clones the current `Arc` out of a read lock, training builds a fresh pair
//! off-lock and swaps it in with one write. A matched pair is all a reader
//! can ever observe.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::dataset::{self, ChurnDataset};
use crate::features::{CustomerFeatures, FEATURE_NAMES};
use crate::model::store::{self, ArtifactPaths};
use crate::model::{ForestConfig, RandomForest, StandardScaler};
use crate::recommend::recommend;
use crate::scoring::{risk_factors, round2, RiskCategory, RiskFactor};
use crate::{AppError, AppResult};

/// Held-out fraction for evaluation
const TEST_FRACTION: f64 = 0.2;

/// Seed shared by the split and the forest
const SEED: u64 = 42;

/// A matched, immutable (classifier, scaler) pair
#[derive(Debug)]
pub struct ModelSnapshot {
    pub forest: RandomForest,
    pub scaler: StandardScaler,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    /// Training-split accuracy, percent, 2 decimals
    pub train_accuracy: f64,
    /// Held-out accuracy, percent, 2 decimals
    pub test_accuracy: f64,
    pub features: [&'static str; 6],
}

/// Full scoring output for one customer
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Churn probability, percent scale, 2 decimals
    pub churn_probability: f64,
    /// Binary churn prediction (0/1)
    pub prediction: u8,
    pub risk_category: RiskCategory,
    pub risk_color: &'static str,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendation: String,
}

/// One row of a dataset batch analysis
#[derive(Debug, Clone, Serialize)]
pub struct CustomerAssessment {
    pub customer_id: String,
    pub churn_probability: f64,
    pub risk_category: RiskCategory,
    pub actual_churn: u8,
}

/// Churn prediction service: trains, persists, reloads and scores
pub struct ChurnPredictor {
    dataset_path: PathBuf,
    artifacts: ArtifactPaths,
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl ChurnPredictor {
    pub fn new(dataset_path: impl Into<PathBuf>, model_dir: &Path) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            artifacts: ArtifactPaths::in_dir(model_dir),
            snapshot: RwLock::new(None),
        }
    }

    /// Train a fresh pair from the labeled dataset, persist it, and make it
    /// the serving snapshot.
    pub fn train(&self) -> AppResult<TrainingSummary> {
        let dataset = dataset::load(&self.dataset_path)?;
        tracing::info!(
            "Training on {} rows from {}",
            dataset.len(),
            self.dataset_path.display()
        );

        let (train_idx, test_idx) = dataset::stratified_split(&dataset.labels, TEST_FRACTION, SEED);
        let (train_features, train_labels) = dataset_subset(&dataset, &train_idx);
        let (test_features, test_labels) = dataset_subset(&dataset, &test_idx);

        // the scaler only ever sees the training split
        let scaler = StandardScaler::fit(&train_features);
        let scaled_train = scaler.transform(&train_features);
        let scaled_test = scaler.transform(&test_features);

        let config = ForestConfig {
            seed: SEED,
            ..ForestConfig::default()
        };
        let forest = RandomForest::fit(&scaled_train, &train_labels, config)?;

        let train_accuracy = round2(forest.accuracy(&scaled_train, &train_labels) * 100.0);
        let test_accuracy = round2(forest.accuracy(&scaled_test, &test_labels) * 100.0);
        tracing::info!(
            "Training complete: train accuracy {:.2}%, test accuracy {:.2}%",
            train_accuracy,
            test_accuracy
        );

        store::save(&self.artifacts, &forest, &scaler)?;

        let snapshot = Arc::new(ModelSnapshot {
            forest,
            scaler,
            trained_at: chrono::Utc::now(),
        });
        *self.snapshot.write() = Some(snapshot);

        Ok(TrainingSummary {
            train_accuracy,
            test_accuracy,
            features: FEATURE_NAMES,
        })
    }

    /// Try to install the persisted pair. Returns whether both artifacts
    /// were found and loaded.
    pub fn load(&self) -> bool {
        match store::load(&self.artifacts) {
            Some((forest, scaler)) => {
                *self.snapshot.write() = Some(Arc::new(ModelSnapshot {
                    forest,
                    scaler,
                    trained_at: chrono::Utc::now(),
                }));
                tracing::info!("Loaded persisted model artifacts");
                true
            }
            None => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// When the serving snapshot was trained or loaded
    pub fn trained_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.snapshot.read().as_ref().map(|s| s.trained_at)
    }

    /// Score one customer record
    pub fn predict(&self, features: &CustomerFeatures) -> AppResult<Prediction> {
        let snapshot = self.current_snapshot()?;
        Ok(score(&snapshot, features))
    }

    /// Score the first `limit` dataset rows against their true labels
    pub fn analyze(&self, limit: usize) -> AppResult<Vec<CustomerAssessment>> {
        let snapshot = self.current_snapshot()?;
        let dataset = dataset::load(&self.dataset_path)?;

        let n = limit.min(dataset.len());
        let mut assessments = Vec::with_capacity(n);
        for i in 0..n {
            let features = CustomerFeatures::from_array(dataset.row(i));
            let prediction = score(&snapshot, &features);
            assessments.push(CustomerAssessment {
                customer_id: dataset.customer_ids[i].clone(),
                churn_probability: prediction.churn_probability,
                risk_category: prediction.risk_category,
                actual_churn: dataset.labels[i],
            });
        }
        Ok(assessments)
    }

    /// Current snapshot, lazily loading persisted artifacts on first use,
    /// the way the original request handlers did.
    fn current_snapshot(&self) -> AppResult<Arc<ModelSnapshot>> {
        if let Some(snapshot) = self.snapshot.read().as_ref() {
            return Ok(snapshot.clone());
        }
        if self.load() {
            if let Some(snapshot) = self.snapshot.read().as_ref() {
                return Ok(snapshot.clone());
            }
        }
        Err(AppError::ModelNotReady)
    }
}

/// Risk Scorer: scale, classify, explain, recommend
fn score(snapshot: &ModelSnapshot, features: &CustomerFeatures) -> Prediction {
    let scaled = snapshot.scaler.transform_row(&features.as_array());
    let probability = snapshot.forest.predict_proba(&scaled);
    let prediction = snapshot.forest.predict(&scaled);

    let factors = risk_factors(features, snapshot.forest.feature_importances());
    let category = RiskCategory::from_probability(probability);
    let recommendation = recommend(category, &factors);

    Prediction {
        churn_probability: round2(probability * 100.0),
        prediction,
        risk_category: category,
        risk_color: category.color(),
        risk_factors: factors,
        recommendation,
    }
}

fn dataset_subset(dataset: &ChurnDataset, indices: &[usize]) -> (ndarray::Array2<f64>, Vec<u8>) {
    let mut flat = Vec::with_capacity(indices.len() * FEATURE_NAMES.len());
    let mut labels = Vec::with_capacity(indices.len());
    for &i in indices {
        flat.extend_from_slice(&dataset.row(i));
        labels.push(dataset.labels[i]);
    }
    let features =
        ndarray::Array2::from_shape_vec((indices.len(), FEATURE_NAMES.len()), flat)
            .expect("subset dimensions are consistent by construction");
    (features, labels)
}
