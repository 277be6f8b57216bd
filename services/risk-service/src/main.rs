use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use prometheus::Registry;
use risk_engine::RiskScorer;
use risk_service::{config::Config, handlers, metrics, middleware::RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Risk Service...");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let scorer = Arc::new(
        RiskScorer::with_config(config.scoring.clone()).context("Invalid scoring configuration")?,
    );
    info!(
        decision_threshold = scorer.config().decision_threshold,
        utc_offset_seconds = scorer.config().time.utc_offset_seconds,
        "Risk scorer initialized"
    );

    let registry = Registry::new();
    metrics::register_metrics(&registry).context("Failed to register metrics")?;
    #[cfg(target_os = "linux")]
    registry
        .register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))
        .context("Failed to register process metrics")?;

    let requests_per_minute = NonZeroU32::new(config.server.requests_per_minute)
        .context("server.requests_per_minute must be positive")?;
    let rate_limiter = RateLimiter::new(requests_per_minute);

    if let Some(delay) = config.demo.simulated_latency() {
        info!(delay_ms = delay.as_millis() as u64, "Simulated latency enabled");
    }

    let server_config = config.server.clone();
    let demo_config = config.demo.clone();

    info!(
        "Starting HTTP server on {}:{}",
        server_config.host, server_config.port
    );

    let app_server_config = server_config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(scorer.clone()))
            .app_data(web::Data::new(app_server_config.clone()))
            .app_data(web::Data::new(demo_config.clone()))
            .app_data(web::Data::new(registry.clone()))
            .wrap(rate_limiter.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .configure(handlers::configure_routes)
    })
    .workers(server_config.workers)
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await?;

    Ok(())
}
