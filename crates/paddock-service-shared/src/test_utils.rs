//! Test utilities for handler testing.
//!
//! [`test_state`] serves a small in-memory season:
//!
//! - 2024 calendar with rounds 1 (conventional) and 2 (sprint)
//! - `2024/1/R`: HAM and VER over two laps, VER's second lap untimed,
//!   telemetry for HAM lap 2 and VER lap 1
//! - `2024/1/Q`: no laps at all
//! - `2024/2/FP1`: one timed NOR lap without telemetry

use std::collections::HashMap;

use paddock_lib::{
    DriverInfo, EventInfo, LapRow, LapTelemetry, MemoryProvider, Polyline, ScheduledSession,
    SessionData, SessionKey,
};

use crate::state::AppState;

pub const FIXTURE_YEAR: i32 = 2024;

/// Shared handler state backed by [`fixture_provider`].
pub fn test_state() -> AppState {
    AppState::from_provider(fixture_provider())
}

pub fn fixture_provider() -> MemoryProvider {
    MemoryProvider::new()
        .with_schedule(FIXTURE_YEAR, fixture_calendar())
        .with_session(SessionKey::new(FIXTURE_YEAR, 1, "R"), race_session())
        .with_session(
            SessionKey::new(FIXTURE_YEAR, 1, "Q"),
            SessionData {
                event: bahrain(),
                ..SessionData::default()
            },
        )
        .with_session(SessionKey::new(FIXTURE_YEAR, 2, "FP1"), practice_session())
}

fn slot(name: &str, date_utc: &str) -> ScheduledSession {
    ScheduledSession {
        name: Some(name.to_string()),
        date_utc: Some(date_utc.to_string()),
    }
}

fn bahrain() -> EventInfo {
    EventInfo {
        round: 1,
        country: Some("Bahrain".to_string()),
        location: Some("Sakhir".to_string()),
        name: Some("Bahrain Grand Prix".to_string()),
        official_name: Some("FORMULA 1 GULF AIR BAHRAIN GRAND PRIX 2024".to_string()),
        event_format: Some("conventional".to_string()),
        event_date: Some("2024-03-02".to_string()),
        f1_api_support: true,
        sessions: vec![
            slot("Practice 1", "2024-02-29T11:30:00Z"),
            slot("Practice 2", "2024-02-29T15:00:00Z"),
            slot("Practice 3", "2024-03-01T12:30:00Z"),
            slot("Qualifying", "2024-03-01T16:00:00Z"),
            slot("Race", "2024-03-02T15:00:00Z"),
        ],
    }
}

fn shanghai() -> EventInfo {
    EventInfo {
        round: 2,
        country: Some("China".to_string()),
        location: Some("Shanghai".to_string()),
        name: Some("Chinese Grand Prix".to_string()),
        official_name: None,
        event_format: Some("sprint_qualifying".to_string()),
        event_date: Some("2024-04-21".to_string()),
        f1_api_support: true,
        sessions: vec![
            slot("Practice 1", "2024-04-19T03:30:00Z"),
            slot("Sprint Qualifying", "2024-04-19T07:30:00Z"),
            slot("Sprint", "2024-04-20T03:00:00Z"),
            slot("Qualifying", "2024-04-20T07:00:00Z"),
            ScheduledSession::default(),
        ],
    }
}

pub fn fixture_calendar() -> Vec<EventInfo> {
    vec![bahrain(), shanghai()]
}

fn driver(code: &str, first: &str, last: &str, team: &str) -> DriverInfo {
    DriverInfo {
        abbreviation: Some(code.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        team_name: Some(team.to_string()),
    }
}

fn trace(offset: f64) -> Polyline {
    Polyline {
        x: vec![0.0 + offset, 120.5 + offset, 240.0 + offset],
        y: vec![10.0, -35.25, 10.0],
    }
}

fn race_session() -> SessionData {
    let driver_info = HashMap::from([
        (
            "44".to_string(),
            driver("HAM", "Lewis", "Hamilton", "Mercedes"),
        ),
        (
            "1".to_string(),
            driver("VER", "Max", "Verstappen", "Red Bull Racing"),
        ),
    ]);

    SessionData {
        event: bahrain(),
        drivers: vec!["44".to_string(), "1".to_string()],
        driver_info,
        laps: vec![
            LapRow::new(1, "44")
                .with_code("HAM")
                .with_position(1)
                .with_lap_time_secs(90.0)
                .with_session_time_secs(0.0),
            LapRow::new(1, "1")
                .with_code("VER")
                .with_position(2)
                .with_lap_time_secs(91.0)
                .with_session_time_secs(1.0),
            LapRow::new(2, "44")
                .with_code("HAM")
                .with_position(1)
                .with_lap_time_secs(89.5)
                .with_session_time_secs(90.0),
            LapRow::new(2, "1")
                .with_code("VER")
                .with_position(2)
                .with_lap_time_secs(f64::NAN)
                .with_session_time_secs(f64::NAN),
        ],
        telemetry: vec![
            LapTelemetry {
                driver_id: "44".to_string(),
                lap_number: 2,
                polyline: trace(0.0),
            },
            LapTelemetry {
                driver_id: "1".to_string(),
                lap_number: 1,
                polyline: trace(1.5),
            },
        ],
    }
}

fn practice_session() -> SessionData {
    SessionData {
        event: shanghai(),
        drivers: vec!["4".to_string()],
        driver_info: HashMap::from([(
            "4".to_string(),
            driver("NOR", "Lando", "Norris", "McLaren"),
        )]),
        laps: vec![LapRow::new(1, "4")
            .with_code("NOR")
            .with_position(1)
            .with_lap_time_secs(95.2)
            .with_session_time_secs(95.2)],
        telemetry: Vec::new(),
    }
}
