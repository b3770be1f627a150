//! # Acquisitions Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the user store adapter
//! - Pick a decision engine (in-process or remote)
//! - Start the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{
    metrics::SdkMeterProvider, propagation::TraceContextPropagator, trace as sdktrace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acquisitions_hex::{AdmissionController, AuthService, SessionKeys, inbound::HttpServer};
use acquisitions_repo::{build_repo, redact_url};
use acquisitions_types::DecisionEngine;
use decision_engine::{HttpEngine, LocalEngine};

use config::Config;

/// How often idle per-client rate-limit state is dropped.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

struct Telemetry {
    tracer: sdktrace::Tracer,
    traces: sdktrace::SdkTracerProvider,
    metrics: SdkMeterProvider,
}

fn init_telemetry() -> anyhow::Result<Telemetry> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let traces = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .build();
    global::set_tracer_provider(traces.clone());

    // HTTP metrics from the router are recorded against the global meter provider.
    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()?;

    let metrics = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .build();
    global::set_meter_provider(metrics.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok(Telemetry {
        tracer: traces.tracer("acquisitions-service"),
        traces,
        metrics,
    })
}

fn build_engine(config: &Config) -> Arc<dyn DecisionEngine> {
    match &config.engine_url {
        Some(url) => {
            let mut engine = HttpEngine::new(url.as_str());
            if let Some(key) = &config.engine_key {
                engine = engine.with_api_key(key.as_str());
            }
            tracing::info!("Using remote decision engine at {}", engine.endpoint());
            Arc::new(engine)
        }
        None => {
            let engine = Arc::new(LocalEngine::default());

            let pruned = engine.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
                loop {
                    ticker.tick().await;
                    pruned.prune();
                }
            });

            tracing::info!("Using in-process decision engine");
            engine
        }
    }
}

fn session_keys(config: &Config) -> SessionKeys {
    let keys = match &config.session_secret {
        Some(secret) => SessionKeys::new(secret, config.session_ttl),
        None => {
            tracing::warn!("SESSION_SECRET is not set; sessions will not survive a restart");
            SessionKeys::random(config.session_ttl)
        }
    };
    keys.with_secure_cookies(config.secure_cookies)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize OpenTelemetry only when a collector is configured
    let telemetry = if config.otlp_endpoint.is_some() {
        Some(init_telemetry()?)
    } else {
        None
    };
    let otel_layer = telemetry
        .as_ref()
        .map(|t| tracing_opentelemetry::layer().with_tracer(t.tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,acquisitions_app=debug,acquisitions_hex=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    tracing::info!("Starting acquisitions server on port {}", config.port);
    tracing::info!("Using database: {}", redact_url(&config.database_url));

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    tracing::debug!("User store backend: {}", repo.backend());

    let service = AuthService::new(repo);
    let admission = AdmissionController::new(build_engine(&config)).with_mode(config.engine_mode);
    let sessions = session_keys(&config);

    // Create and run the HTTP server
    let server = HttpServer::new(service, admission, sessions);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure telemetry is flushed before exit
    if let Some(telemetry) = telemetry {
        let _ = telemetry.traces.shutdown();
        let _ = telemetry.metrics.shutdown();
    }
    Ok(())
}
