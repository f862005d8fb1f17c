//! Random forest classifier: bootstrap-aggregated CART trees with
//! class-balanced weighting and impurity-based feature importance

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::ModelError;
use crate::features::FEATURE_COUNT;

/// Forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Master seed; per-tree seeds derive from it so training is deterministic
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            seed: 42,
        }
    }
}

/// A fitted forest plus the global importance vector frozen at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    config: ForestConfig,
    feature_importances: [f64; FEATURE_COUNT],
}

impl RandomForest {
    /// Fit the forest on scaled training features.
    ///
    /// Class weights are balanced the usual way, `n / (2 * count(class))`,
    /// so the minority churn class is not drowned out. Each tree trains on a
    /// bootstrap sample drawn from its own seeded RNG and considers
    /// `sqrt(FEATURE_COUNT)` features per split.
    pub fn fit(
        features: &Array2<f64>,
        labels: &[u8],
        config: ForestConfig,
    ) -> Result<Self, ModelError> {
        let n = labels.len();
        if n == 0 || features.nrows() != n {
            return Err(ModelError::EmptyTrainingSet);
        }

        let positives = labels.iter().filter(|&&l| l == 1).count();
        let negatives = n - positives;
        if positives == 0 || negatives == 0 {
            return Err(ModelError::SingleClass);
        }

        let class_weights = [
            n as f64 / (2.0 * negatives as f64),
            n as f64 / (2.0 * positives as f64),
        ];

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            n_split_features: (FEATURE_COUNT as f64).sqrt().ceil() as usize,
        };

        let mut master_rng = StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.n_trees);
        let mut importances = [0.0; FEATURE_COUNT];

        for _ in 0..config.n_trees {
            let mut tree_rng = StdRng::seed_from_u64(master_rng.gen());
            let sample: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
            trees.push(DecisionTree::fit(
                features,
                labels,
                &sample,
                class_weights,
                &params,
                &mut tree_rng,
                &mut importances,
            ));
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for value in importances.iter_mut() {
                *value /= total;
            }
        }

        Ok(Self {
            trees,
            config,
            feature_importances: importances,
        })
    }

    /// Probability of the positive (churn) class for one scaled row
    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_distribution(row)[1])
            .sum();
        sum / self.trees.len() as f64
    }

    /// Binary prediction at the 0.5 probability cut
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> u8 {
        u8::from(self.predict_proba(row) >= 0.5)
    }

    /// Fraction of rows predicted correctly
    pub fn accuracy(&self, features: &Array2<f64>, labels: &[u8]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let mut correct = 0;
        for (i, &label) in labels.iter().enumerate() {
            let mut row = [0.0; FEATURE_COUNT];
            for (j, v) in row.iter_mut().enumerate() {
                *v = features[[i, j]];
            }
            if self.predict(&row) == label {
                correct += 1;
            }
        }
        correct as f64 / labels.len() as f64
    }

    /// Normalized per-feature importance, contract order, fixed at fit time
    pub fn feature_importances(&self) -> &[f64; FEATURE_COUNT] {
        &self.feature_importances
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}
