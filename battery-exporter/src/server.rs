// Battery Exporter - HTTP ingest and scrape endpoints
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! HTTP surface of the exporter.
//!
//! | Path       | Method   | Behavior                              |
//! |------------|----------|---------------------------------------|
//! | `/post`    | any      | ingest one status record              |
//! | `/metrics` | any      | Prometheus text exposition            |
//! | `/`, other | POST     | ingest, same as `/post`               |
//! | `/`, other | non-POST | liveness placeholder                  |

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use battery_monitor::{IngestError, Ingestor};
use std::sync::Arc;
use tracing::error;

/// Body served on `/` for anything but POST.
pub const HEALTH_BODY: &str = "🔋";

/// Application state shared across handlers.
pub struct AppState {
    ingestor: Ingestor,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(ingestor: Ingestor, max_body_bytes: usize) -> Self {
        Self {
            ingestor,
            max_body_bytes,
        }
    }
}

/// Build the exporter's router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", any(metrics_handler))
        .route("/post", any(post_handler))
        .route("/", any(default_handler))
        .fallback(default_handler)
        .with_state(state)
}

/// Catch-all handler - ingests POSTs, answers everything else with the placeholder.
async fn default_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Body,
) -> Response {
    if method == Method::POST {
        return ingest(&state, body).await;
    }
    (StatusCode::OK, HEALTH_BODY).into_response()
}

/// Ingest handler for `/post`.
async fn post_handler(State(state): State<Arc<AppState>>, body: Body) -> Response {
    ingest(&state, body).await
}

async fn ingest(state: &AppState, body: Body) -> Response {
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => return ingest_error(&IngestError::Read(e.to_string())),
    };

    // Submission may block on the pushgateway round trip
    let ingestor = state.ingestor.clone();
    match tokio::task::spawn_blocking(move || ingestor.submit(&bytes)).await {
        Ok(Ok(_)) => (StatusCode::OK, [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")]).into_response(),
        Ok(Err(e)) => ingest_error(&e),
        Err(e) => {
            error!("ingest task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
                "internal error",
            )
                .into_response()
        }
    }
}

fn ingest_error(err: &IngestError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        err.to_string(),
    )
        .into_response()
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.ingestor.status() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
