//! `/health/*` handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use node_probe::{BlockNumber, ProbeError, ServiceStatus};

use super::timestamp;
use crate::state::SharedState;

type ErrorReply<E> = (StatusCode, Json<E>);

/// Block metrics embedded in the service and detailed responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetrics {
    pub latest_block: BlockNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<usize>,
}

/// Response body for `GET /health/service`.
#[derive(Debug, Serialize)]
pub struct ServiceHealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: ServiceStatus,
    pub metrics: BlockMetrics,
}

/// Error body for `GET /health/service`.
#[derive(Debug, Serialize)]
pub struct ServiceErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub error: String,
}

/// Response body for `GET /health/block`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub latest_block: BlockNumber,
}

/// Error body shared by `/health/block` and `/health/logs`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Node section of the detailed status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub service: ServiceStatus,
    pub metrics: BlockMetrics,
    pub system_status: String,
}

/// Response body for `GET /health/detailed`.
#[derive(Debug, Serialize)]
pub struct DetailedResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub node: NodeSnapshot,
}

/// Error body for `GET /health/detailed`.
#[derive(Debug, Serialize)]
pub struct DetailedErrorResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub error: String,
}

/// Query string of `GET /health/logs`.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<String>,
}

/// Response body for `GET /health/logs`.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub timestamp: String,
    pub lines: usize,
    pub logs: Vec<String>,
}

fn probe_failed(state: &SharedState, endpoint: &'static str, err: &ProbeError) {
    let source = err.source_kind();
    tracing::warn!(endpoint, source, error = %err, "probe failed");
    state.metrics.record_probe_error(source);
}

/// `GET /health/service`
///
/// Service state, main pid and the latest block. `status` is `"ok"` only
/// when the unit is active.
pub async fn service(
    State(state): State<SharedState>,
) -> Result<Json<ServiceHealthResponse>, ErrorReply<ServiceErrorResponse>> {
    match state.aggregator.service_health().await {
        Ok(health) => Ok(Json(ServiceHealthResponse {
            status: if health.service.is_active() { "ok" } else { "error" },
            timestamp: timestamp(),
            service: health.service,
            metrics: BlockMetrics {
                latest_block: health.latest_block,
                window_size: None,
            },
        })),
        Err(e) => {
            probe_failed(&state, "service", &e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ServiceErrorResponse {
                    status: "error",
                    message: "Failed to check service health",
                    timestamp: timestamp(),
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// `GET /health/block`
///
/// Latest block over the default window. A missing block is a normal
/// answer (`"Not found"`); an unreadable log is a 500.
pub async fn block(
    State(state): State<SharedState>,
) -> Result<Json<BlockResponse>, ErrorReply<ErrorResponse>> {
    match state.aggregator.probe_block(state.log.tail_lines).await {
        Ok(latest_block) => Ok(Json(BlockResponse { latest_block })),
        Err(e) => {
            probe_failed(&state, "block", &e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// `GET /health/detailed`
///
/// Service, block and system status probed concurrently. Any failed probe
/// turns the whole response into an error.
pub async fn detailed(
    State(state): State<SharedState>,
) -> Result<Json<DetailedResponse>, ErrorReply<DetailedErrorResponse>> {
    match state.aggregator.detailed_status().await {
        Ok(snapshot) => Ok(Json(DetailedResponse {
            status: "ok",
            timestamp: timestamp(),
            node: NodeSnapshot {
                service: snapshot.service,
                metrics: BlockMetrics {
                    latest_block: snapshot.latest_block,
                    window_size: Some(snapshot.window_size),
                },
                system_status: snapshot.system_status,
            },
        })),
        Err(e) => {
            probe_failed(&state, "detailed", &e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DetailedErrorResponse {
                    status: "error",
                    timestamp: timestamp(),
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// `GET /health/logs?lines=N`
///
/// Raw tail of the node log. `lines` defaults to the configured window and
/// is clamped to the configured maximum.
pub async fn logs(
    State(state): State<SharedState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ErrorReply<ErrorResponse>> {
    let requested = match query.lines.as_deref().map(str::trim) {
        None | Some("") => state.log.tail_lines,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("`lines` must be a positive integer, got {raw:?}"),
                    }),
                ));
            }
        },
    };
    let lines = state.log.clamp_lines(requested);

    match state.aggregator.probe_logs(lines).await {
        Ok(window) => Ok(Json(LogsResponse {
            timestamp: timestamp(),
            lines,
            logs: window.into_lines(),
        })),
        Err(e) => {
            probe_failed(&state, "logs", &e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
