//! Shared HTTP infrastructure for the Paddock API.
//!
//! - [`AppState`]: session provider plus replay settings, shared by handlers
//! - [`ApiError`]: the single error envelope every failure is rendered as
//! - [`params`]: declarative query-parameter validation
//! - [`ValidatedQuery`] / [`ApiPath`]: extractors that reject with [`ApiError`]
//! - [`health`], [`metrics`], [`logging`], [`middleware`]: service plumbing
//!
//! # Architecture
//!
//! Handlers stay thin; all domain logic lives in `paddock-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Validate query parameters (ValidatedQuery)               │
//! │  - Call the session provider (AppState::with_provider)      │
//! │  - Aggregate / format via paddock-lib                       │
//! │  - Serialize JSON                                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! Enable the `test-utils` feature for an in-memory fixture [`AppState`].

pub mod config;
mod error;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod params;
mod request;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, ServiceConfig};
pub use error::{
    default_code, from_lib_error, panic_response, ApiError, ErrorEnvelope,
    CODE_DRIVER_LAPS_NOT_FOUND, CODE_INVALID_QUERY_PARAMS, CODE_LAP_NOT_FOUND,
    CODE_SESSION_NOT_FOUND, CODE_TELEMETRY_UNAVAILABLE,
};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_provider_failure, record_query_rejected,
    record_replay_built, record_track_map, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use params::{
    validate, ParamSpec, ParamType, ParamValue, QuerySpec, Rule, Transform, ValidatedParams,
};
pub use request::{ApiPath, NoParams, QueryParams, TrackQuery, ValidatedQuery};
pub use state::{AppState, AppStateError};
