//! CART decision tree used as the forest's base learner

use ndarray::Array2;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

/// Growth limits, shared by every tree of a forest
#[derive(Debug, Clone)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered per split (sqrt subsampling at forest level)
    pub n_split_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Weighted class distribution [p(no churn), p(churn)]
        distribution: [f64; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted binary classification tree stored as a flat node arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the given bootstrap sample.
    ///
    /// Splits minimize class-weighted Gini impurity over a random feature
    /// subset. Each accepted split adds its weighted impurity decrease to
    /// `importances`, which the forest later normalizes.
    pub(crate) fn fit(
        features: &Array2<f64>,
        labels: &[u8],
        sample: &[usize],
        class_weights: [f64; 2],
        params: &TreeParams,
        rng: &mut StdRng,
        importances: &mut [f64; FEATURE_COUNT],
    ) -> Self {
        let mut builder = TreeBuilder {
            features,
            labels,
            class_weights,
            params,
            nodes: Vec::new(),
        };
        builder.build(sample.to_vec(), 0, rng, importances);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Class distribution at the leaf this row falls into
    pub fn predict_distribution(&self, row: &[f64; FEATURE_COUNT]) -> [f64; 2] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution } => return *distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

struct CandidateSplit {
    feature: usize,
    threshold: f64,
    /// Absolute weighted impurity decrease
    decrease: f64,
}

struct TreeBuilder<'a> {
    features: &'a Array2<f64>,
    labels: &'a [u8],
    class_weights: [f64; 2],
    params: &'a TreeParams,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build(
        &mut self,
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
        importances: &mut [f64; FEATURE_COUNT],
    ) -> usize {
        let counts = self.weighted_counts(&indices);
        let impurity = gini(&counts);

        let splittable = depth < self.params.max_depth
            && indices.len() >= self.params.min_samples_split.max(2)
            && impurity > 0.0;

        if splittable {
            if let Some(split) = self.best_split(&indices, impurity, &counts, rng) {
                importances[split.feature] += split.decrease;

                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .into_iter()
                    .partition(|&i| self.features[[i, split.feature]] <= split.threshold);

                let node_index = self.nodes.len();
                // placeholder until both children exist
                self.nodes.push(Node::Leaf {
                    distribution: [0.0, 0.0],
                });
                let left = self.build(left_idx, depth + 1, rng, importances);
                let right = self.build(right_idx, depth + 1, rng, importances);
                self.nodes[node_index] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                return node_index;
            }
        }

        let total = counts[0] + counts[1];
        let distribution = if total > 0.0 {
            [counts[0] / total, counts[1] / total]
        } else {
            [0.5, 0.5]
        };
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn weighted_counts(&self, indices: &[usize]) -> [f64; 2] {
        let mut counts = [0.0; 2];
        for &i in indices {
            counts[self.labels[i] as usize] += self.class_weights[self.labels[i] as usize];
        }
        counts
    }

    fn best_split(
        &self,
        indices: &[usize],
        parent_impurity: f64,
        parent_counts: &[f64; 2],
        rng: &mut StdRng,
    ) -> Option<CandidateSplit> {
        let parent_weight = parent_counts[0] + parent_counts[1];
        let candidates = rand::seq::index::sample(rng, FEATURE_COUNT, self.params.n_split_features);

        let mut best: Option<CandidateSplit> = None;
        for feature in candidates.iter() {
            let mut values: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (self.features[[i, feature]], self.labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left = [0.0; 2];
            let mut right = *parent_counts;
            for k in 0..values.len() - 1 {
                let (value, label) = values[k];
                let weight = self.class_weights[label as usize];
                left[label as usize] += weight;
                right[label as usize] -= weight;

                // split only between distinct values
                let next = values[k + 1].0;
                if next <= value {
                    continue;
                }

                let left_weight = left[0] + left[1];
                let right_weight = right[0] + right[1];
                let decrease = parent_weight * parent_impurity
                    - left_weight * gini(&left)
                    - right_weight * gini(&right);

                if decrease > best.as_ref().map(|b| b.decrease).unwrap_or(1e-12) {
                    best = Some(CandidateSplit {
                        feature,
                        threshold: (value + next) / 2.0,
                        decrease,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: &[f64; 2]) -> f64 {
    let total = counts[0] + counts[1];
    if total <= 0.0 {
        return 0.0;
    }
    let p0 = counts[0] / total;
    let p1 = counts[1] / total;
    1.0 - p0 * p0 - p1 * p1
}
