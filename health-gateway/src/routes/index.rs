use axum::Json;
use serde::Serialize;

/// Paths served by the gateway.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub service_health: &'static str,
    pub latest_block: &'static str,
    pub detailed: &'static str,
    pub logs: &'static str,
    pub metrics: &'static str,
}

/// Capability listing.
#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub endpoints: Endpoints,
}

/// `GET /`
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Redbelly Node Health Check API",
        endpoints: Endpoints {
            service_health: "/health/service",
            latest_block: "/health/block",
            detailed: "/health/detailed",
            logs: "/health/logs?lines=N",
            metrics: "/metrics",
        },
    })
}
