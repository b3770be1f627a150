//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use acquisitions_types::{DecisionEngine, UserRepository};

use super::admission::admission_middleware;
use super::auth::session_middleware;
use super::handlers::{self, AppState};
use crate::AuthService;
use crate::admission::AdmissionController;
use crate::openapi::ApiDoc;
use crate::session::SessionKeys;

/// HTTP Server for the Acquisitions API.
pub struct HttpServer<R: UserRepository, E: DecisionEngine> {
    state: Arc<AppState<R>>,
    admission: Arc<AdmissionController<E>>,
}

impl<R: UserRepository, E: DecisionEngine> HttpServer<R, E> {
    pub fn new(service: AuthService<R>, admission: AdmissionController<E>, sessions: SessionKeys) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                sessions: Arc::new(sessions),
                started_at: Instant::now(),
            }),
            admission: Arc::new(admission),
        }
    }

    /// Builds the Axum router with all routes.
    ///
    /// Request order: trace, metrics, CORS, security headers, session,
    /// admission, handler.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health::<R>))
            .route("/api", get(handlers::api_status))
            .route("/api/auth/sign-up", post(handlers::sign_up::<R>))
            .route("/api/auth/sign-in", post(handlers::sign_in::<R>))
            .route("/api/auth/sign-out", post(handlers::sign_out::<R>))
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(middleware::from_fn_with_state(
                self.admission.clone(),
                admission_middleware::<E>,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.sessions.clone(),
                session_middleware,
            ))
            .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .layer(security_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
            .layer(security_header(header::REFERRER_POLICY, "no-referrer"))
            .layer(security_header(header::X_DNS_PREFETCH_CONTROL, "off"))
            .layer(CorsLayer::permissive())
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
