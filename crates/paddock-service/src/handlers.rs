//! Request handlers for the `/api/v1` routes.
//!
//! Each handler validates its query, asks the provider for data, and hands
//! the result to `paddock-lib` for aggregation. Failures are rendered by
//! [`ApiError`].

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use paddock_lib::{
    EventDetail, EventSummary, SessionData, SessionKey, SessionReplay, TrackMap,
    current_and_previous_seasons, season_summaries, session_replay, track_map,
};
use paddock_service_shared::{
    ApiError, ApiPath, AppState, NoParams, TrackQuery, ValidatedQuery, from_lib_error,
    record_replay_built, record_track_map,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct SeasonsResponse {
    pub seasons: [i32; 2],
}

#[derive(Debug, Serialize)]
pub struct SeasonEventsResponse {
    pub year: i32,
    pub events: Vec<EventSummary>,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    pub service: &'static str,
}

/// `GET /api/v1/events/seasons`
pub async fn seasons(ValidatedQuery(_): ValidatedQuery<NoParams>) -> ApiResult<SeasonsResponse> {
    Ok(Json(SeasonsResponse {
        seasons: current_and_previous_seasons(Utc::now()),
    }))
}

/// `GET /api/v1/events/{year}`
pub async fn season_events(
    State(state): State<AppState>,
    ApiPath(year): ApiPath<i32>,
    ValidatedQuery(_): ValidatedQuery<NoParams>,
) -> ApiResult<SeasonEventsResponse> {
    let events = state
        .with_provider(move |provider| provider.season_schedule(year))
        .await?;

    Ok(Json(SeasonEventsResponse {
        year,
        events: season_summaries(year, &events),
    }))
}

/// `GET /api/v1/events/{year}/{round}`
pub async fn event_detail(
    State(state): State<AppState>,
    ApiPath((year, round)): ApiPath<(i32, u32)>,
    ValidatedQuery(_): ValidatedQuery<NoParams>,
) -> ApiResult<EventDetail> {
    let event = state
        .with_provider(move |provider| provider.event(year, round))
        .await?;

    Ok(Json(EventDetail::from_event(year, &event)))
}

/// `GET /api/v1/sessions/{year}/{round}/{code}/track`
pub async fn session_track(
    State(state): State<AppState>,
    ApiPath((year, round, code)): ApiPath<(i32, u32, String)>,
    ValidatedQuery(query): ValidatedQuery<TrackQuery>,
) -> ApiResult<TrackMap> {
    let key = session_key(year, round, &code);
    let session = load_session(&state, &key).await?;

    let map = track_map(&key, &session, query.driver.as_deref())
        .map_err(|error| from_lib_error(&error))?;
    record_track_map(query.driver.is_some());

    info!(
        session = %key,
        driver = map.driver.as_deref().unwrap_or("-"),
        points = map.polyline.x.len(),
        "track map served"
    );
    Ok(Json(map))
}

/// `GET /api/v1/sessions/{year}/{round}/{code}/replay`
pub async fn session_replay_handler(
    State(state): State<AppState>,
    ApiPath((year, round, code)): ApiPath<(i32, u32, String)>,
    ValidatedQuery(_): ValidatedQuery<NoParams>,
) -> ApiResult<SessionReplay> {
    let key = session_key(year, round, &code);
    let session = load_session(&state, &key).await?;

    let replay = session_replay(&key, &session, state.interval_policy());
    record_replay_built(&key.session, replay.replay.lap_count());

    info!(
        session = %key,
        laps = replay.replay.lap_count(),
        drivers = replay.replay.drivers.len(),
        "replay served"
    );
    Ok(Json(replay))
}

/// `GET /api/v1/races/health`
pub async fn races_health(ValidatedQuery(_): ValidatedQuery<NoParams>) -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "ok",
        service: "races",
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::new(axum::http::StatusCode::NOT_FOUND, "Resource not found")
}

/// Fallback for known routes called with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(axum::http::StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

// Session codes are case-insensitive on the wire.
fn session_key(year: i32, round: u32, code: &str) -> SessionKey {
    SessionKey::new(year, round, code.trim().to_ascii_uppercase())
}

async fn load_session(state: &AppState, key: &SessionKey) -> Result<SessionData, ApiError> {
    let key = key.clone();
    state
        .with_provider(move |provider| provider.session(&key))
        .await
}
