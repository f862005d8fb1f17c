//! Retention recommendations from risk category and top factors.
//!
//! Pure function of (category, ordered factor list). No state.

use crate::scoring::{RiskCategory, RiskFactor};

const LOW_MESSAGE: &str = "Customer is engaged. Continue standard engagement practices.";

const MEDIUM_FALLBACK: &str = "Monitor engagement patterns closely";

const HIGH_MESSAGE: &str = "URGENT: Assign dedicated account manager | \
    Offer retention incentive | Immediate human outreach required";

/// Map a risk assessment to an action string.
///
/// Medium risk inspects at most the top two factors; High risk always gets
/// the same urgent escalation regardless of which factors fired.
pub fn recommend(category: RiskCategory, factors: &[RiskFactor]) -> String {
    match category {
        RiskCategory::Low => LOW_MESSAGE.to_string(),
        RiskCategory::Medium => {
            let actions: Vec<&str> = factors
                .iter()
                .take(2)
                .filter_map(|factor| match factor.key {
                    "engagement_momentum" => Some("Send personalized re-engagement campaign"),
                    "behavioral_drift" => Some("Trigger feature discovery onboarding"),
                    "silence_index" => Some("Schedule proactive check-in call"),
                    _ => None,
                })
                .collect();
            if actions.is_empty() {
                MEDIUM_FALLBACK.to_string()
            } else {
                actions.join(" | ")
            }
        }
        RiskCategory::High => HIGH_MESSAGE.to_string(),
    }
}
