//! Health check handlers for orchestrator probes.
//!
//! `/health/live` answers as long as the process runs. `/health/ready`
//! additionally requires the provider to report at least one season.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok", or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Seasons the provider can serve (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<i32>>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            seasons: None,
        }
    }

    pub fn ready(service: &str, version: &str, seasons: Vec<i32>) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            seasons: Some(seasons),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            seasons: None,
        }
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"paddock-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"paddock-service-shared","version":"0.1.0","seasons":[2023,2024]}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let status = match state.with_provider(|p| p.available_seasons()).await {
        Ok(seasons) if !seasons.is_empty() => {
            return (StatusCode::OK, Json(HealthStatus::ready(service, version, seasons)))
                .into_response();
        }
        Ok(_) => HealthStatus::not_ready(service, version, "no seasons available"),
        Err(error) => HealthStatus::not_ready(service, version, &error.message),
    };

    (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
}
