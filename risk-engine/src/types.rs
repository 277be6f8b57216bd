//! Core types for risk engine

use crate::error::NO_USABLE_INPUT_MESSAGE;
use crate::features::Feature;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Score below the decision threshold
    Legitimate,
    /// Score at or above the decision threshold
    Fraudulent,
}

impl Classification {
    /// Classify a total score against a decision threshold
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score < threshold {
            Classification::Legitimate
        } else {
            Classification::Fraudulent
        }
    }

    /// Lowercase label, used for metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Legitimate => "legitimate",
            Classification::Fraudulent => "fraudulent",
        }
    }
}

/// Risk assessment result
///
/// Callers must check `error` first: when it is set the classification is
/// `Legitimate` and the confidence is `0`, and neither carries meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Classification
    pub classification: Classification,

    /// Confidence in `[65, 95]`, two decimals; `0` on error
    pub confidence: f64,

    /// Set only when the input had no usable feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskAssessment {
    /// Assessment returned when no feature was supplied
    pub fn no_usable_input() -> Self {
        Self {
            classification: Classification::Legitimate,
            confidence: 0.0,
            error: Some(NO_USABLE_INPUT_MESSAGE.to_string()),
        }
    }

    /// Whether the evaluation failed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Contribution of one feature to the risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    /// Feature scored
    pub feature: Feature,

    /// Points added to the score
    pub points: u32,

    /// Whether the caller supplied the feature
    pub supplied: bool,

    /// Branch taken
    pub reason: String,
}

/// Full explanation of a successful evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Evaluation ID, for log correlation
    pub evaluation_id: Uuid,

    /// Number of supplied features
    pub features_used: usize,

    /// Per-feature contributions, in catalog order
    pub factors: Vec<RiskFactor>,

    /// Deterministic sum of factor points
    pub base_score: u32,

    /// Random jitter added on top of the base score
    pub jitter: f64,

    /// `base_score + jitter`
    pub total_score: f64,

    /// Classification
    pub classification: Classification,

    /// Confidence in `[65, 95]`, two decimals
    pub confidence: f64,

    /// Assessment timestamp
    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl ScoreBreakdown {
    /// Reduce the breakdown to the public assessment contract
    pub fn assessment(&self) -> RiskAssessment {
        RiskAssessment {
            classification: self.classification,
            confidence: self.confidence,
            error: None,
        }
    }

    /// Points contributed by a feature
    pub fn points_for(&self, feature: Feature) -> Option<u32> {
        self.factors
            .iter()
            .find(|f| f.feature == feature)
            .map(|f| f.points)
    }
}

impl From<ScoreBreakdown> for RiskAssessment {
    fn from(breakdown: ScoreBreakdown) -> Self {
        breakdown.assessment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_threshold() {
        assert_eq!(Classification::from_score(49.99, 50.0), Classification::Legitimate);
        assert_eq!(Classification::from_score(50.0, 50.0), Classification::Fraudulent);
    }

    #[test]
    fn test_assessment_serialization() {
        let ok = RiskAssessment {
            classification: Classification::Fraudulent,
            confidence: 91.41,
            error: None,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["classification"], "Fraudulent");
        assert_eq!(json["confidence"], 91.41);
        assert!(json.get("error").is_none());

        let failed = serde_json::to_value(RiskAssessment::no_usable_input()).unwrap();
        assert_eq!(failed["classification"], "Legitimate");
        assert_eq!(failed["confidence"], 0.0);
        assert_eq!(failed["error"], "at least one feature value is required");
    }
}
