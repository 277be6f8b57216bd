use crate::config::{DemoConfig, ServerConfig};
use crate::errors::{ServiceError, ServiceResult};
use crate::metrics::{
    self, EVALUATIONS_TOTAL, EVALUATION_DURATION, FEATURES_USED, REJECTED_REQUESTS, RISK_SCORE,
};
use crate::models::*;
use actix_web::{http::header, web, HttpResponse};
use chrono::Utc;
use prometheus::Registry;
use risk_engine::{RawFeatures, RiskAssessment, RiskScorer, ScoreBreakdown, TransactionFeatures};
use std::sync::Arc;
use tracing::info;

// ===== Ping =====
pub async fn ping(server: web::Data<ServerConfig>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .insert_header((header::PRAGMA, "no-cache"))
        .insert_header((header::EXPIRES, "0"))
        .json(PingResponse {
            message: "pong".to_string(),
            timestamp: Utc::now().timestamp_millis(),
            server: server.name.clone(),
        })
}

// ===== Health Check =====
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().timestamp(),
    })
}

// ===== Evaluate Risk =====
pub async fn evaluate_risk(
    req: web::Json<RawFeatures>,
    scorer: web::Data<Arc<RiskScorer>>,
    demo: web::Data<DemoConfig>,
) -> ServiceResult<HttpResponse> {
    let features = req.into_inner().into_features();
    simulate_latency(&demo).await;

    let assessment = match score(&scorer, &features) {
        Ok(breakdown) => breakdown.assessment(),
        Err(risk_engine::Error::NoUsableInput) => {
            EVALUATIONS_TOTAL.with_label_values(&["error"]).inc();
            RiskAssessment::no_usable_input()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok().json(assessment))
}

// ===== Explain Risk =====
pub async fn explain_risk(
    req: web::Json<RawFeatures>,
    scorer: web::Data<Arc<RiskScorer>>,
    demo: web::Data<DemoConfig>,
) -> ServiceResult<HttpResponse> {
    let features = req.into_inner().into_features();
    simulate_latency(&demo).await;

    let breakdown = score(&scorer, &features).map_err(|e| {
        if matches!(e, risk_engine::Error::NoUsableInput) {
            EVALUATIONS_TOTAL.with_label_values(&["error"]).inc();
        }
        ServiceError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(breakdown))
}

// ===== Feature Catalog =====
pub async fn list_features() -> HttpResponse {
    HttpResponse::Ok().json(FeatureCatalog::build(Utc::now().timestamp()))
}

// ===== Prometheus Metrics =====
pub async fn metrics_endpoint(registry: web::Data<Registry>) -> ServiceResult<HttpResponse> {
    let body = metrics::render(&registry)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

async fn simulate_latency(demo: &DemoConfig) {
    if let Some(delay) = demo.simulated_latency() {
        tokio::time::sleep(delay).await;
    }
}

fn score(
    scorer: &RiskScorer,
    features: &TransactionFeatures,
) -> risk_engine::Result<ScoreBreakdown> {
    let timer = EVALUATION_DURATION.start_timer();
    let result = scorer.score(features, &mut rand::thread_rng());
    timer.observe_duration();

    let breakdown = result?;
    EVALUATIONS_TOTAL
        .with_label_values(&[breakdown.classification.as_str()])
        .inc();
    RISK_SCORE.observe(breakdown.total_score);
    FEATURES_USED.observe(breakdown.features_used as f64);

    info!(
        evaluation_id = %breakdown.evaluation_id,
        features_used = breakdown.features_used,
        total_score = breakdown.total_score,
        classification = ?breakdown.classification,
        confidence = breakdown.confidence,
        "Transaction evaluated"
    );

    Ok(breakdown)
}

fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    REJECTED_REQUESTS.inc();
    ServiceError::ValidationError(err.to_string()).into()
}

// ===== Configure Routes =====
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api/v1/risk")
                .route("/evaluate", web::post().to(evaluate_risk))
                .route("/explain", web::post().to(explain_risk))
                .route("/features", web::get().to(list_features)),
        )
        .service(
            web::resource("/api/ping")
                .route(web::get().to(ping))
                .route(web::post().to(ping)),
        )
        .route("/health", web::get().to(health_check))
        .route("/metrics", web::get().to(metrics_endpoint));
}
