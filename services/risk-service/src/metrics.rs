use crate::errors::{ServiceError, ServiceResult};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    // Business metrics - Risk scoring
    pub static ref EVALUATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("risk_evaluations_total", "Total risk evaluations by outcome"),
        &["outcome"]
    ).expect("metric can be created");

    pub static ref REJECTED_REQUESTS: IntCounter = IntCounter::new(
        "risk_rejected_requests_total",
        "Evaluation requests rejected for malformed JSON bodies"
    ).expect("metric can be created");

    pub static ref RISK_SCORE: Histogram = Histogram::with_opts(
        HistogramOpts::new("risk_score_distribution", "Distribution of total risk scores")
            .buckets(vec![30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 120.0])
    ).expect("metric can be created");

    pub static ref FEATURES_USED: Histogram = Histogram::with_opts(
        HistogramOpts::new("risk_features_used", "Number of features supplied per evaluation")
            .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    ).expect("metric can be created");

    pub static ref EVALUATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("risk_evaluation_duration_seconds", "Scoring duration in seconds")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005])
    ).expect("metric can be created");
}

/// Register all metrics with the given registry
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(EVALUATIONS_TOTAL.clone()))?;
    registry.register(Box::new(REJECTED_REQUESTS.clone()))?;
    registry.register(Box::new(RISK_SCORE.clone()))?;
    registry.register(Box::new(FEATURES_USED.clone()))?;
    registry.register(Box::new(EVALUATION_DURATION.clone()))?;

    Ok(())
}

/// Generate metrics output in Prometheus text format
pub fn render(registry: &Registry) -> ServiceResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ServiceError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let registry = Registry::new();
        assert!(register_metrics(&registry).is_ok());
        // Second registration of the same collectors is rejected
        assert!(register_metrics(&registry).is_err());
    }

    #[test]
    fn test_render() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
        EVALUATIONS_TOTAL.with_label_values(&["fraudulent"]).inc();

        let output = render(&registry).unwrap();
        assert!(output.contains("risk_evaluations_total"));
        assert!(output.contains("outcome=\"fraudulent\""));
    }
}
