//! Paddock HTTP API.
//!
//! # Endpoints
//!
//! - `GET /api/v1/events/seasons` - current and previous season
//! - `GET /api/v1/events/{year}` - season calendar
//! - `GET /api/v1/events/{year}/{round}` - one event with its sessions
//! - `GET /api/v1/sessions/{year}/{round}/{code}/track?driver=XXX` - fastest-lap track map
//! - `GET /api/v1/sessions/{year}/{round}/{code}/replay` - lap-by-lap replay
//! - `GET /api/v1/races/health` - service marker
//! - `GET /metrics` - Prometheus metrics
//! - `GET /health/live`, `GET /health/ready` - orchestrator probes

pub mod handlers;

use axum::{Router, routing::get};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use paddock_service_shared::{
    AppState, MetricsConfig, MetricsLayer, health_live, health_ready, metrics_handler,
    panic_response,
};

use crate::handlers::{
    event_detail, method_not_allowed, not_found, races_health, season_events, seasons,
    session_replay_handler, session_track,
};

/// Routes under `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/events/seasons", get(seasons))
        .route("/events/{year}", get(season_events))
        .route("/events/{year}/{round}", get(event_detail))
        .route("/sessions/{year}/{round}/{code}/track", get(session_track))
        .route("/sessions/{year}/{round}/{code}/replay", get(session_replay_handler))
        .route("/races/health", get(races_health))
}

/// Build the full application router.
pub fn app(state: AppState, metrics: &MetricsConfig) -> Router {
    let mut router = Router::new()
        .nest("/api/v1", api_routes())
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready));

    if metrics.enabled {
        router = router.route(&metrics.path, get(metrics_handler));
    }

    router
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .with_state(state)
}
