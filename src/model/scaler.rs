//! Standard scaling with parameters frozen at fit time

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

/// Per-column centering/scaling transform.
///
/// Fit once on the training split; the stored means and deviations are the
/// only parameters ever applied at inference, so scaled inputs always match
/// what the classifier was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: [f64; FEATURE_COUNT],
    stds: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fit column means and standard deviations on a feature matrix
    pub fn fit(features: &Array2<f64>) -> Self {
        let n = features.nrows().max(1) as f64;
        let mut means = [0.0; FEATURE_COUNT];
        let mut stds = [0.0; FEATURE_COUNT];

        for j in 0..FEATURE_COUNT {
            let column = features.column(j);
            let mean = column.sum() / n;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            means[j] = mean;
            // constant columns scale by 1 instead of dividing by zero
            stds[j] = if variance > 0.0 { variance.sqrt() } else { 1.0 };
        }

        Self { means, stds }
    }

    /// Scale a single row in contract order
    pub fn transform_row(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            scaled[j] = (row[j] - self.means[j]) / self.stds[j];
        }
        scaled
    }

    /// Scale a whole matrix
    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        let mut scaled = features.clone();
        for mut row in scaled.rows_mut() {
            for j in 0..FEATURE_COUNT {
                row[j] = (row[j] - self.means[j]) / self.stds[j];
            }
        }
        scaled
    }
}
