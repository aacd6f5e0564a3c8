//! Service identification and health checks.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use jiff::Timestamp;

use crate::TRACING_TARGET_HEALTH;
use crate::extract::Json;
use crate::handler::response::{HealthStatus, ServiceInfo};
use crate::service::{HealthMonitor, ServiceState};

/// Name reported by `GET /`.
const SERVICE_NAME: &str = "parcel";

#[tracing::instrument(skip_all)]
async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: SERVICE_NAME.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        checked_at: Timestamp::now(),
    })
}

#[tracing::instrument(skip_all)]
async fn health_status(
    State(health): State<HealthMonitor>,
) -> (StatusCode, Json<HealthStatus>) {
    let is_healthy = health.is_healthy().await;
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET_HEALTH,
        is_healthy,
        status_code = status_code.as_u16(),
        "health status response prepared"
    );

    let response = HealthStatus {
        is_healthy,
        checked_at: Timestamp::now(),
    };

    (status_code, Json(response))
}

/// Returns a [`Router`] with the monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_status))
}
