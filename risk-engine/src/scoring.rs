//! Risk scoring engine

use crate::{
    Classification, Error, Feature, Reading, Result, RiskAssessment, RiskFactor, ScoreBreakdown,
    ScoringConfig, TransactionFeatures, UniformSource,
};
use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use tracing::debug;
use uuid::Uuid;

/// Risk scorer
///
/// Immutable once built; share it behind an `Arc` and hand each evaluation
/// its own random source.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: ScoringConfig,
    offset: FixedOffset,
}

impl RiskScorer {
    /// Create new risk scorer with the default tuning
    pub fn new() -> Self {
        let config = ScoringConfig::default();
        let offset = FixedOffset::east_opt(config.time.utc_offset_seconds)
            .unwrap_or_else(|| Utc.fix());
        Self { config, offset }
    }

    /// Create a scorer from a validated configuration
    pub fn with_config(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let offset = FixedOffset::east_opt(config.time.utc_offset_seconds).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "invalid UTC offset {}",
                config.time.utc_offset_seconds
            ))
        })?;
        Ok(Self { config, offset })
    }

    /// Active configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Evaluate a transaction
    ///
    /// Never fails: missing input is reported through
    /// [`RiskAssessment::error`].
    pub fn evaluate<R: UniformSource + ?Sized>(
        &self,
        features: &TransactionFeatures,
        rng: &mut R,
    ) -> RiskAssessment {
        match self.score(features, rng) {
            Ok(breakdown) => breakdown.assessment(),
            Err(_) => RiskAssessment::no_usable_input(),
        }
    }

    /// Evaluate with the thread-local entropy source
    pub fn evaluate_random(&self, features: &TransactionFeatures) -> RiskAssessment {
        self.evaluate(features, &mut rand::thread_rng())
    }

    /// Score a transaction and explain every contribution
    ///
    /// Draws two values from `rng`: score jitter first, then confidence.
    pub fn score<R: UniformSource + ?Sized>(
        &self,
        features: &TransactionFeatures,
        rng: &mut R,
    ) -> Result<ScoreBreakdown> {
        let features_used = features.features_used();
        if features_used == 0 {
            return Err(Error::NoUsableInput);
        }

        let factors = vec![
            self.card_factor(features),
            self.amount_factor(features),
            self.time_factor(features),
            self.population_factor(features),
            self.fixed_factor(
                features,
                Feature::PostalCode,
                self.config.postal_code_points,
            ),
            self.fixed_factor(
                features,
                Feature::AccountNumber,
                self.config.account_number_points,
            ),
        ];
        let base_score: u32 = factors.iter().map(|f| f.points).sum();

        let jitter_max = if features_used == 1 {
            self.config.jitter.single_feature_max
        } else {
            self.config.jitter.multi_feature_max
        };
        let jitter = rng.next_uniform() * jitter_max;
        let total_score = f64::from(base_score) + jitter;

        let classification =
            Classification::from_score(total_score, self.config.decision_threshold);
        let confidence = self.confidence(features_used, rng.next_uniform());

        let evaluation_id = Uuid::new_v4();
        debug!(
            evaluation_id = %evaluation_id,
            features_used,
            base_score,
            jitter,
            total_score,
            classification = ?classification,
            confidence,
            "Risk score calculated"
        );

        Ok(ScoreBreakdown {
            evaluation_id,
            features_used,
            factors,
            base_score,
            jitter,
            total_score,
            classification,
            confidence,
            assessed_at: Utc::now(),
        })
    }

    /// Hour of day of a Unix timestamp in the configured offset
    pub fn local_hour(&self, unix_time: i64) -> Option<u32> {
        DateTime::<Utc>::from_timestamp(unix_time, 0)
            .map(|utc| utc.with_timezone(&self.offset).hour())
    }

    fn card_factor(&self, features: &TransactionFeatures) -> RiskFactor {
        let weights = &self.config.card;
        let card = features
            .card_number
            .as_deref()
            .filter(|c| !c.trim().is_empty());

        let (points, reason) = match card {
            Some(card) => {
                let digits: String = card.chars().filter(|c| !c.is_whitespace()).collect();
                if weights
                    .trusted_prefixes
                    .iter()
                    .any(|p| digits.starts_with(p.as_str()))
                {
                    (weights.trusted_points, "Trusted card network prefix")
                } else {
                    (weights.other_points, "Unrecognised card network prefix")
                }
            }
            None => (weights.default_points, "Card number not supplied"),
        };

        factor(Feature::CardNumber, points, card.is_some(), reason)
    }

    fn amount_factor(&self, features: &TransactionFeatures) -> RiskFactor {
        let weights = &self.config.amount;

        let (points, reason) = match &features.amount {
            Some(Reading::Value(amount)) if *amount > weights.high_above => {
                (weights.high_points, "High value transaction")
            }
            Some(Reading::Value(amount)) if *amount > weights.elevated_above => {
                (weights.elevated_points, "Elevated value transaction")
            }
            Some(Reading::Value(_)) => (weights.low_points, "Low value transaction"),
            Some(Reading::Unreadable(_)) => (weights.low_points, "Unreadable amount"),
            None => (weights.default_points, "Amount not supplied"),
        };

        factor(Feature::Amount, points, features.amount.is_some(), reason)
    }

    fn time_factor(&self, features: &TransactionFeatures) -> RiskFactor {
        let weights = &self.config.time;

        let (points, reason) = match &features.unix_time {
            Some(Reading::Value(unix_time)) => match self.local_hour(*unix_time) {
                Some(hour)
                    if hour < weights.unusual_before_hour
                        || hour > weights.unusual_after_hour =>
                {
                    (weights.unusual_points, "Unusual hour")
                }
                Some(_) => (weights.regular_points, "Regular hour"),
                None => {
                    debug!(unix_time = *unix_time, "Timestamp out of calendar range");
                    (weights.regular_points, "Timestamp out of range")
                }
            },
            Some(Reading::Unreadable(_)) => (weights.regular_points, "Unreadable timestamp"),
            None => (weights.default_points, "Time not supplied"),
        };

        factor(Feature::UnixTime, points, features.unix_time.is_some(), reason)
    }

    fn population_factor(&self, features: &TransactionFeatures) -> RiskFactor {
        let weights = &self.config.population;

        let (points, reason) = match &features.city_population {
            Some(Reading::Value(p)) if *p < weights.small_below => {
                (weights.small_points, "Small city")
            }
            Some(Reading::Value(p)) if *p > weights.large_above => {
                (weights.large_points, "Large city")
            }
            Some(Reading::Value(_)) => (weights.medium_points, "Medium city"),
            Some(Reading::Unreadable(_)) => (weights.medium_points, "Unreadable city population"),
            None => (weights.default_points, "City population not supplied"),
        };

        factor(
            Feature::CityPopulation,
            points,
            features.city_population.is_some(),
            reason,
        )
    }

    fn fixed_factor(
        &self,
        features: &TransactionFeatures,
        feature: Feature,
        points: u32,
    ) -> RiskFactor {
        let supplied = features.is_supplied(feature);
        let reason = if supplied {
            "Limited effect"
        } else {
            "Not supplied"
        };
        factor(feature, points, supplied, reason)
    }

    fn confidence(&self, features_used: usize, draw: f64) -> f64 {
        let config = &self.config.confidence;
        let base = if features_used == 1 {
            config.single_feature_base
        } else {
            config.multi_feature_base
        };
        let confidence = (base + draw * config.spread).clamp(config.min, config.max);
        (confidence * 100.0).round() / 100.0
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn factor(feature: Feature, points: u32, supplied: bool, reason: &str) -> RiskFactor {
    RiskFactor {
        feature,
        points,
        supplied,
        reason: reason.to_string(),
    }
}
