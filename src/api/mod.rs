use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cache::OrgResultCache,
    config::Config,
    directory::DirectoryLookup,
    metrics::{self, RequestTimer},
    synth::Synthesizer,
    MockError, Result,
};

pub mod health;
pub mod query_range;

pub const QUERY_RANGE_PATH: &str = "/api/v1/query_range";

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn DirectoryLookup>,
    pub cache: Arc<OrgResultCache>,
    pub synthesizer: Arc<Synthesizer>,
    pub systems_per_org: usize,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn DirectoryLookup>,
        synthesizer: Synthesizer,
        systems_per_org: usize,
    ) -> Self {
        Self {
            directory,
            cache: Arc::new(OrgResultCache::new()),
            synthesizer: Arc::new(synthesizer),
            systems_per_org,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_check))
        .route(QUERY_RANGE_PATH, get(query_range::query_range))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn track_request(request: Request, next: Next) -> Response {
    let timer = RequestTimer::new();
    info!("HTTP request start time - {}", Utc::now().to_rfc3339());

    let response = next.run(request).await;

    info!("HTTP request end time - {}", Utc::now().to_rfc3339());
    info!("HTTP request response time in seconds - {}", timer.elapsed_secs());
    response
}

async fn metrics_handler() -> Response {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.listen_addr();
    info!("Starting metering prometheus mock on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| MockError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MockError::Internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
