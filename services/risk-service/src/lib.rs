//! Tahseen risk service
//!
//! HTTP surface over [`risk_engine::RiskScorer`].

pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;

// Re-exports for convenience
pub use config::Config;
pub use errors::{ServiceError, ServiceResult};
