//! The fixed six-feature contract every customer record must supply

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Number of behavioral features per customer
pub const FEATURE_COUNT: usize = 6;

/// Feature names in contract order. Dataset columns, scaler columns and
/// importance vectors all follow this ordering.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "engagement_momentum",
    "behavioral_drift",
    "silence_index",
    "response_degradation",
    "session_decay_rate",
    "consistency_score",
];

/// A validated customer feature record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeatures {
    pub engagement_momentum: f64,
    pub behavioral_drift: f64,
    pub silence_index: f64,
    pub response_degradation: f64,
    pub session_decay_rate: f64,
    pub consistency_score: f64,
}

impl CustomerFeatures {
    /// Check an incoming JSON body against the six-key contract before
    /// deserializing. Reports every missing or non-numeric key at once.
    pub fn from_value(value: &serde_json::Value) -> AppResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::Validation("request body must be a JSON object".into()))?;

        let missing: Vec<&str> = FEATURE_NAMES
            .iter()
            .filter(|name| !obj.get(**name).map(|v| v.is_number()).unwrap_or(false))
            .copied()
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "missing or non-numeric features: {}",
                missing.join(", ")
            )));
        }

        serde_json::from_value(value.clone())
            .map_err(|e| AppError::Validation(format!("invalid feature payload: {e}")))
    }

    /// Feature values in contract order
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.engagement_momentum,
            self.behavioral_drift,
            self.silence_index,
            self.response_degradation,
            self.session_decay_rate,
            self.consistency_score,
        ]
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            engagement_momentum: values[0],
            behavioral_drift: values[1],
            silence_index: values[2],
            response_degradation: values[3],
            session_decay_rate: values[4],
            consistency_score: values[5],
        }
    }
}

/// `engagement_momentum` -> `Engagement Momentum`
pub fn display_name(feature: &str) -> String {
    feature
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
