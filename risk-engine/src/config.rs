//! Scoring configuration
//!
//! The defaults reproduce the dashboard's demo tuning. None of the values are
//! calibrated against fraud data.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Scores below this are legitimate
    pub decision_threshold: f64,

    /// Card number factor
    pub card: CardWeights,

    /// Amount factor
    pub amount: AmountWeights,

    /// Time-of-day factor
    pub time: TimeWeights,

    /// City population factor
    pub population: PopulationWeights,

    /// Postal code contribution, supplied or not
    pub postal_code_points: u32,

    /// Account number contribution, supplied or not
    pub account_number_points: u32,

    /// Score jitter
    pub jitter: JitterConfig,

    /// Confidence model
    pub confidence: ConfidenceConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decision_threshold: 50.0,
            card: CardWeights::default(),
            amount: AmountWeights::default(),
            time: TimeWeights::default(),
            population: PopulationWeights::default(),
            postal_code_points: 8,
            account_number_points: 12,
            jitter: JitterConfig::default(),
            confidence: ConfidenceConfig::default(),
        }
    }
}

/// Card number weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardWeights {
    /// Leading digits of the lower-risk networks (Visa, Mastercard)
    #[serde(deserialize_with = "prefix_list")]
    pub trusted_prefixes: Vec<String>,
    /// Points for a trusted prefix
    pub trusted_points: u32,
    /// Points for any other prefix
    pub other_points: u32,
    /// Points when not supplied
    pub default_points: u32,
}

impl Default for CardWeights {
    fn default() -> Self {
        Self {
            trusted_prefixes: vec!["4".to_string(), "5".to_string()],
            trusted_points: 10,
            other_points: 30,
            default_points: 15,
        }
    }
}

/// Amount weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountWeights {
    /// Amounts strictly above this are high
    pub high_above: Decimal,
    /// Points for a high amount
    pub high_points: u32,
    /// Amounts strictly above this (and not high) are elevated
    pub elevated_above: Decimal,
    /// Points for an elevated amount
    pub elevated_points: u32,
    /// Points for anything else
    pub low_points: u32,
    /// Points when not supplied
    pub default_points: u32,
}

impl Default for AmountWeights {
    fn default() -> Self {
        Self {
            high_above: Decimal::from(10_000),
            high_points: 40,
            elevated_above: Decimal::from(5_000),
            elevated_points: 20,
            low_points: 5,
            default_points: 15,
        }
    }
}

/// Time-of-day weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWeights {
    /// Hours strictly before this are unusual
    pub unusual_before_hour: u32,
    /// Hours strictly after this are unusual
    pub unusual_after_hour: u32,
    /// Points for an unusual hour
    pub unusual_points: u32,
    /// Points for a regular hour
    pub regular_points: u32,
    /// Points when not supplied
    pub default_points: u32,
    /// Offset from UTC used to derive the local hour, in seconds
    pub utc_offset_seconds: i32,
}

impl Default for TimeWeights {
    fn default() -> Self {
        Self {
            unusual_before_hour: 6,
            unusual_after_hour: 22,
            unusual_points: 25,
            regular_points: 10,
            default_points: 10,
            // Asia/Riyadh
            utc_offset_seconds: 3 * 3600,
        }
    }
}

/// City population weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationWeights {
    /// Populations strictly below this are small cities
    pub small_below: u64,
    /// Points for a small city
    pub small_points: u32,
    /// Populations strictly above this are large cities
    pub large_above: u64,
    /// Points for a large city
    pub large_points: u32,
    /// Points for anything in between
    pub medium_points: u32,
    /// Points when not supplied
    pub default_points: u32,
}

impl Default for PopulationWeights {
    fn default() -> Self {
        Self {
            small_below: 10_000,
            small_points: 15,
            large_above: 1_000_000,
            large_points: 5,
            medium_points: 10,
            default_points: 10,
        }
    }
}

/// Score jitter ranges, `[0, max)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Upper bound when exactly one feature is supplied
    pub single_feature_max: f64,
    /// Upper bound otherwise
    pub multi_feature_max: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            single_feature_max: 15.0,
            multi_feature_max: 20.0,
        }
    }
}

/// Confidence model: `clamp(base + U[0, spread), min, max)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Base when exactly one feature is supplied
    pub single_feature_base: f64,
    /// Base otherwise
    pub multi_feature_base: f64,
    /// Width of the random spread
    pub spread: f64,
    /// Lower clamp
    pub min: f64,
    /// Upper clamp
    pub max: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            single_feature_base: 75.0,
            multi_feature_base: 85.0,
            spread: 10.0,
            min: 65.0,
            max: 95.0,
        }
    }
}

impl ScoringConfig {
    /// Check the configuration for inconsistent values
    pub fn validate(&self) -> Result<()> {
        if !self.decision_threshold.is_finite() {
            return Err(Error::InvalidConfig(
                "decision_threshold must be finite".to_string(),
            ));
        }

        if self.card.trusted_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "card.trusted_prefixes must not contain blank prefixes".to_string(),
            ));
        }

        if self.amount.elevated_above > self.amount.high_above {
            return Err(Error::InvalidConfig(format!(
                "amount.elevated_above {} exceeds amount.high_above {}",
                self.amount.elevated_above, self.amount.high_above
            )));
        }

        if self.time.unusual_before_hour > 23 || self.time.unusual_after_hour > 23 {
            return Err(Error::InvalidConfig(
                "time hours must be within 0-23".to_string(),
            ));
        }

        if self.time.utc_offset_seconds.abs() >= 86_400 {
            return Err(Error::InvalidConfig(format!(
                "time.utc_offset_seconds {} is outside one day",
                self.time.utc_offset_seconds
            )));
        }

        if self.population.small_below > self.population.large_above {
            return Err(Error::InvalidConfig(format!(
                "population.small_below {} exceeds population.large_above {}",
                self.population.small_below, self.population.large_above
            )));
        }

        let jitter = &self.jitter;
        if !(jitter.single_feature_max >= 0.0 && jitter.multi_feature_max >= 0.0)
            || !jitter.single_feature_max.is_finite()
            || !jitter.multi_feature_max.is_finite()
        {
            return Err(Error::InvalidConfig(
                "jitter bounds must be finite and non-negative".to_string(),
            ));
        }

        let confidence = &self.confidence;
        let values = [
            confidence.single_feature_base,
            confidence.multi_feature_base,
            confidence.spread,
            confidence.min,
            confidence.max,
        ];
        if values.iter().any(|v| !v.is_finite()) || confidence.spread < 0.0 {
            return Err(Error::InvalidConfig(
                "confidence values must be finite with a non-negative spread".to_string(),
            ));
        }
        if confidence.min > confidence.max {
            return Err(Error::InvalidConfig(format!(
                "confidence.min {} exceeds confidence.max {}",
                confidence.min, confidence.max
            )));
        }

        Ok(())
    }
}

/// Prefix list from a sequence, or a single prefix given as text or digits
///
/// Environment overlays parse a lone `4` as a number rather than a list.
fn prefix_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Prefixes {
        Many(Vec<String>),
        One(String),
        Digits(u64),
    }

    Ok(match Prefixes::deserialize(deserializer)? {
        Prefixes::Many(list) => list,
        Prefixes::One(prefix) => vec![prefix],
        Prefixes::Digits(digits) => vec![digits.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.decision_threshold, 50.0);
        assert_eq!(config.postal_code_points, 8);
        assert_eq!(config.account_number_points, 12);
        assert_eq!(config.confidence.min, 65.0);
        assert_eq!(config.confidence.max, 95.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config: ScoringConfig = serde_json::from_value(serde_json::json!({
            "decision_threshold": 60.0,
            "time": { "utc_offset_seconds": 0 }
        }))
        .unwrap();

        assert_eq!(config.decision_threshold, 60.0);
        assert_eq!(config.time.utc_offset_seconds, 0);
        assert_eq!(config.time.unusual_points, 25);
        assert_eq!(config.amount, AmountWeights::default());
    }

    #[test]
    fn test_trusted_prefixes_accept_scalar() {
        let parse = |value: serde_json::Value| -> Vec<String> {
            let config: ScoringConfig =
                serde_json::from_value(serde_json::json!({ "card": { "trusted_prefixes": value } }))
                    .unwrap();
            config.card.trusted_prefixes
        };

        assert_eq!(parse(serde_json::json!(["4", "51"])), vec!["4", "51"]);
        assert_eq!(parse(serde_json::json!("6")), vec!["6"]);
        assert_eq!(parse(serde_json::json!(37)), vec!["37"]);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ScoringConfig::default();
        config.confidence.min = 96.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = ScoringConfig::default();
        config.jitter.multi_feature_max = -1.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.time.unusual_after_hour = 24;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.population.small_below = 2_000_000;
        assert!(config.validate().is_err());
    }
}
