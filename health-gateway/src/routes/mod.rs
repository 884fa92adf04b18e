//! HTTP surface.
//!
//! - `GET /`
//! - `GET /health/service`
//! - `GET /health/block`
//! - `GET /health/detailed`
//! - `GET /health/logs?lines=N`
//! - `GET /metrics`

pub mod health;
pub mod index;
pub mod metrics;

use axum::{Json, Router, http::StatusCode, routing::get};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::SharedState;

/// Builds the router with CORS and request logging.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/health/service", get(health::service))
        .route("/health/block", get(health::block))
        .route("/health/detailed", get(health::detailed))
        .route("/health/logs", get(health::logs))
        .route("/metrics", get(metrics::scrape))
        .fallback(|| async { (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))) })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
