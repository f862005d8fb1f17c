//! Risk indicator thresholds, factor ranking, and probability buckets

use serde::Serialize;

use crate::features::{display_name, CustomerFeatures, FEATURE_COUNT, FEATURE_NAMES};

/// Most factors reported per prediction
pub const MAX_RISK_FACTORS: usize = 3;

/// Risk bucket for a churn probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Bucket a probability on the [0, 1] scale
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            RiskCategory::Low
        } else if probability < 0.6 {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    /// Presentational color for the UI
    pub fn color(&self) -> &'static str {
        match self {
            RiskCategory::Low => "#10b981",
            RiskCategory::Medium => "#f59e0b",
            RiskCategory::High => "#ef4444",
        }
    }
}

/// One feature that crossed its risk threshold
#[derive(Debug, Clone, Serialize)]
pub struct RiskFactor {
    /// Canonical feature name, used for recommendation matching
    #[serde(skip_serializing)]
    pub key: &'static str,
    /// Display name, e.g. "Engagement Momentum"
    pub feature: String,
    /// Raw input value, rounded to 2 decimals
    pub value: f64,
    /// Global feature importance as a percentage, rounded to 2 decimals
    pub importance: f64,
}

/// Fixed per-feature risk condition
fn is_risk_indicator(feature: &str, value: f64) -> bool {
    match feature {
        "engagement_momentum" => value < -20.0,
        "behavioral_drift" => value > 40.0,
        "silence_index" => value > 8.0,
        "response_degradation" => value > 100.0,
        "session_decay_rate" => value > 30.0,
        "consistency_score" => value < 50.0,
        _ => false,
    }
}

/// Collect the features that crossed their thresholds, ranked by the
/// classifier's global importance (descending) and truncated to the top 3.
pub fn risk_factors(
    features: &CustomerFeatures,
    importances: &[f64; FEATURE_COUNT],
) -> Vec<RiskFactor> {
    let values = features.as_array();
    let mut factors: Vec<RiskFactor> = Vec::new();
    for j in 0..FEATURE_COUNT {
        let name = FEATURE_NAMES[j];
        if is_risk_indicator(name, values[j]) {
            factors.push(RiskFactor {
                key: name,
                feature: display_name(name),
                value: round2(values[j]),
                importance: round2(importances[j] * 100.0),
            });
        }
    }

    factors.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    factors.truncate(MAX_RISK_FACTORS);
    factors
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
