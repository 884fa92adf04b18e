use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use node_probe::metrics::TEXT_CONTENT_TYPE;

use crate::state::SharedState;

/// `GET /metrics`
///
/// Refreshes the latest-block gauge from a fresh block probe, then encodes
/// the registry. `NotFound` publishes 0; a failed probe keeps the previous
/// gauge value and bumps the probe error counter.
pub async fn scrape(State(state): State<SharedState>) -> Response {
    match state.aggregator.probe_block(state.log.tail_lines).await {
        Ok(block) => state.metrics.set_latest_block(block.gauge_value()),
        Err(e) => {
            tracing::warn!(error = %e, "block probe failed during scrape");
            state.metrics.record_probe_error(e.source_kind());
        }
    }

    match state.metrics.gather_text() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode Prometheus metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}
