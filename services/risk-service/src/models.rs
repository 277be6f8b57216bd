use risk_engine::Feature;
use serde::{Deserialize, Serialize};

// ===== Ping =====
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
    pub timestamp: i64, // ms since epoch
    pub server: String,
}

// ===== Health =====
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
}

// ===== Feature Catalog =====
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    pub id: String,
    pub field_id: String,
    pub label: String,
    pub help_text: String,
    pub placeholder: String,
    pub sample_values: Vec<String>,
}

impl FeatureDescriptor {
    pub fn describe(feature: Feature, now: i64) -> Self {
        Self {
            id: feature.wire_name().to_string(),
            field_id: feature.field_id().to_string(),
            label: feature.label().to_string(),
            help_text: feature.help_text().to_string(),
            placeholder: feature.placeholder().to_string(),
            sample_values: feature.sample_values(now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureCatalog {
    pub features: Vec<FeatureDescriptor>,
}

impl FeatureCatalog {
    pub fn build(now: i64) -> Self {
        Self {
            features: Feature::ALL
                .into_iter()
                .map(|f| FeatureDescriptor::describe(f, now))
                .collect(),
        }
    }
}
