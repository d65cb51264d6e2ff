//! Web server module for the exporter.
//!
//! Serves the scraped metrics in the Prometheus text format plus a liveness
//! probe and a small landing page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::collector::Collector;
use crate::exposition::{CONTENT_TYPE, encode_text};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Sources scraped on every metrics request.
    pub collector: Arc<Collector>,
    /// Deadline for one scrape.
    pub scrape_timeout: Duration,
    /// Path the metrics are served on.
    pub metrics_path: String,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();
    let app_state = Arc::new(state);

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz_handler))
        .route(&metrics_path, get(metrics_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(app_state)
}

/// Landing page linking to the metrics path.
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html><head><title>Wall Connector Exporter</title></head>\
         <body><h1>Wall Connector Exporter</h1>\
         <p><a href=\"{path}\">Metrics</a></p></body></html>",
        path = state.metrics_path
    ))
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Scrape every source and render the text exposition.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let start = Instant::now();
    let samples = state.collector.collect(state.scrape_timeout).await;

    match encode_text(&samples) {
        Ok(body) => {
            tracing::debug!(
                samples = samples.len(),
                duration_ms = start.elapsed().as_millis(),
                "Scrape complete"
            );
            ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}
