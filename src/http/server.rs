//! Metrics HTTP server.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, timeout)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::exposition;
use crate::registry::Registry;
use crate::scheduler::{ReloadHandle, ReloadReason, TriggerOutcome};
use crate::store::MetricsStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub store: Arc<MetricsStore>,
    pub reloads: ReloadHandle,
    /// Self-metrics; absent when no recorder was installed.
    pub prometheus: Option<PrometheusHandle>,
}

/// HTTP server exposing probe results.
pub struct MetricsServer {
    router: Router,
}

impl MetricsServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/healthz", get(health_handler))
            .route("/-/reload", post(reload_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Metrics server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Metrics server stopped");
        Ok(())
    }
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = exposition::render(&state.store, &state.registry);
    if let Some(handle) = &state.prometheus {
        body.push_str(&handle.render());
    }
    ([(header::CONTENT_TYPE, TEXT_FORMAT)], body)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn reload_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.reloads.trigger(ReloadReason::Admin) {
        TriggerOutcome::Queued => (StatusCode::ACCEPTED, "reload requested\n"),
        TriggerOutcome::Coalesced => (StatusCode::ACCEPTED, "reload already pending\n"),
        TriggerOutcome::Closed => (StatusCode::SERVICE_UNAVAILABLE, "scheduler stopped\n"),
    }
}
