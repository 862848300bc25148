//! Error model for every API response that is not a success.
//!
//! All failures reach the client in one envelope:
//!
//! ```json
//! {"error": {"status": 404, "code": "session_not_found", "message": "...", "details": {...}}}
//! ```
//!
//! `details` is omitted when empty. When no explicit machine code is given,
//! the code is derived from the status via [`default_code`].

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use paddock_lib::Error as LibError;

/// Malformed or unknown query parameters.
pub const CODE_INVALID_QUERY_PARAMS: &str = "invalid_query_params";

/// The provider could not load the requested session.
pub const CODE_SESSION_NOT_FOUND: &str = "session_not_found";

/// The session has no laps for the requested driver.
pub const CODE_DRIVER_LAPS_NOT_FOUND: &str = "driver_laps_not_found";

/// No timed lap could be selected.
pub const CODE_LAP_NOT_FOUND: &str = "lap_not_found";

/// Position telemetry missing for the selected lap.
pub const CODE_TELEMETRY_UNAVAILABLE: &str = "telemetry_unavailable";

/// Default codes for common statuses.
const DEFAULT_ERROR_CODES: &[(u16, &str)] = &[
    (400, "bad_request"),
    (401, "unauthorized"),
    (403, "forbidden"),
    (404, "not_found"),
    (500, "internal_error"),
    (502, "bad_gateway"),
];

/// Machine code used when none is supplied explicitly.
pub fn default_code(status: u16) -> &'static str {
    DEFAULT_ERROR_CODES
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, code)| *code)
        .unwrap_or("error")
}

/// Structured API error.
///
/// # Example
///
/// ```
/// use paddock_service_shared::ApiError;
/// use axum::http::StatusCode;
///
/// let error = ApiError::new(StatusCode::NOT_FOUND, "Unable to load session 2024 round 1 (R)")
///     .with_code("session_not_found");
/// assert_eq!(error.status, 404);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,

    /// Stable snake_case machine code.
    pub code: String,

    /// Human-readable message.
    pub message: String,

    /// Structured details, keyed by parameter or field name.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

/// Wire envelope: `{"error": ApiError}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

impl ApiError {
    /// Create an error with the default code for `status`.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            code: default_code(status.as_u16()).to_string(),
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Override the machine code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replace the details mapping.
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    /// Add a single details entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// 400 `invalid_query_params` carrying the full per-parameter error map.
    pub fn invalid_query_params(details: Map<String, Value>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid query parameters")
            .with_code(CODE_INVALID_QUERY_PARAMS)
            .with_details(details)
    }

    /// 404 with an explicit code.
    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message).with_code(code)
    }

    /// 502 for provider failures that are not the caller's fault.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// 500 with a generic message; internal detail stays in the logs.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorEnvelope { error: self })).into_response()
    }
}

/// Translate a library error into the API taxonomy.
///
/// This is the only place provider failures are mapped; unexpected errors are
/// logged here with full detail and reach the client as a generic 500.
pub fn from_lib_error(error: &LibError) -> ApiError {
    match error {
        LibError::SessionNotFound { .. } => {
            ApiError::not_found(CODE_SESSION_NOT_FOUND, error.to_string())
        }
        LibError::DriverLapsNotFound { .. } => {
            ApiError::not_found(CODE_DRIVER_LAPS_NOT_FOUND, error.to_string())
        }
        LibError::LapNotFound => ApiError::not_found(CODE_LAP_NOT_FOUND, error.to_string()),
        LibError::TelemetryUnavailable { .. } => {
            ApiError::not_found(CODE_TELEMETRY_UNAVAILABLE, error.to_string())
        }
        LibError::EventNotFound { year, round } => ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Unable to load event for {year} round {round}"),
        ),
        LibError::ScheduleUnavailable { year, .. } => {
            tracing::warn!(error = %error, "schedule fetch failed");
            ApiError::bad_gateway(format!("Unable to load schedule for {year}"))
        }
        _ => {
            tracing::error!(error = %error, "unexpected provider error");
            ApiError::internal()
        }
    }
}

/// Response for a handler panic, used with `tower_http::catch_panic`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %message, "handler panicked");
    ApiError::internal().into_response()
}
