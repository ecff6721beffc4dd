//! Health check endpoint.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Fixed "ok" marker.
    pub status: &'static str,
    /// Server time at the moment of the check.
    pub timestamp: DateTime<Utc>,
}

/// Liveness check. Does not touch the store or the gateway.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
