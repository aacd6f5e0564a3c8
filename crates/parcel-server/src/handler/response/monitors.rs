use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Service identification returned by `GET /`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub checked_at: Timestamp,
}

/// Result of `GET /health`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Whether the bucket is reachable.
    pub is_healthy: bool,
    pub checked_at: Timestamp,
}
