use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub model_gateway: String,
}

pub async fn banner() -> &'static str {
    "Backend running with Groq AI"
}

/// Health check endpoint. A down model gateway degrades the service, since
/// seasonal data and cached waypoints are still served.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let gateway_ok = state.gateway.health_check().await.is_ok();

    let (status, gateway_status) = if gateway_ok {
        ("healthy", "ok")
    } else {
        ("degraded", "error")
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                model_gateway: gateway_status.to_string(),
            },
        }),
    )
}
