use config::{ConfigError, Environment};
use risk_engine::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub demo: DemoConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Reported by the ping endpoint
    pub name: String,
    pub requests_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
            workers: 4,
            name: "tahseen-risk-service".to_string(),
            requests_per_minute: 600,
        }
    }
}

/// Demo-only behaviour, off by default
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DemoConfig {
    /// Artificial delay before each evaluation, mimicking network latency
    pub simulated_latency_ms: u64,
}

impl DemoConfig {
    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }
}

const ENV_PREFIX: &str = "RISK_SERVICE";

/// Environment keys read as comma-separated lists
const LIST_KEYS: [&str; 1] = ["scoring.card.trusted_prefixes"];

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    /// Load from an explicit variable map in place of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let server = ServerConfig::default();
        let port = vars.get("SERVICE_PORT").cloned();

        let mut builder = config::Config::builder()
            // Server defaults
            .set_default("server.host", server.host)?
            .set_default("server.port", i64::from(server.port))?
            .set_default("server.workers", server.workers as i64)?
            .set_default("server.name", server.name)?
            .set_default(
                "server.requests_per_minute",
                i64::from(server.requests_per_minute),
            )?
            // Demo hooks
            .set_default("demo.simulated_latency_ms", 0)?;

        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment.source(Some(vars)));

        // Override from environment variables
        if let Some(port) = port {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.server.port, 8085);
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.server.requests_per_minute, 600);
        assert_eq!(config.demo.simulated_latency_ms, 0);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_scoring_overlay_from_env() {
        let config = Config::from_vars(vars(&[
            ("RISK_SERVICE__SCORING__DECISION_THRESHOLD", "60"),
            ("RISK_SERVICE__SCORING__CARD__TRUSTED_PREFIXES", "4,5,6"),
            ("RISK_SERVICE__SCORING__AMOUNT__HIGH_ABOVE", "12000"),
            ("RISK_SERVICE__SCORING__TIME__UTC_OFFSET_SECONDS", "0"),
            ("RISK_SERVICE__SERVER__NAME", "edge-1"),
            ("RISK_SERVICE__DEMO__SIMULATED_LATENCY_MS", "250"),
            ("SERVICE_PORT", "9000"),
        ]))
        .unwrap();

        let scoring = &config.scoring;
        assert_eq!(scoring.decision_threshold, 60.0);
        assert_eq!(scoring.card.trusted_prefixes, vec!["4", "5", "6"]);
        assert_eq!(scoring.amount.high_above.to_string(), "12000");
        assert_eq!(scoring.time.utc_offset_seconds, 0);
        assert_eq!(scoring.jitter, ScoringConfig::default().jitter);
        assert_eq!(config.server.name, "edge-1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.demo.simulated_latency_ms, 250);
    }

    #[test]
    fn test_single_trusted_prefix_from_env() {
        let config = Config::from_vars(vars(&[(
            "RISK_SERVICE__SCORING__CARD__TRUSTED_PREFIXES",
            "4",
        )]))
        .unwrap();
        assert_eq!(config.scoring.card.trusted_prefixes, vec!["4"]);
    }

    #[test]
    fn test_simulated_latency_disabled_by_default() {
        assert_eq!(DemoConfig::default().simulated_latency(), None);

        let demo = DemoConfig {
            simulated_latency_ms: 1500,
        };
        assert_eq!(demo.simulated_latency(), Some(Duration::from_millis(1500)));
    }
}
