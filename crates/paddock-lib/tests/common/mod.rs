//! Shared fixtures for integration tests.

use std::collections::HashMap;

use paddock_lib::{DriverInfo, EventInfo, LapRow, SessionData};

fn driver(code: &str, first: &str, last: &str, team: &str) -> DriverInfo {
    DriverInfo {
        abbreviation: Some(code.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        team_name: Some(team.to_string()),
    }
}

/// Two drivers over two laps; VER's second lap has no timing at all.
#[allow(dead_code)]
pub fn two_lap_session() -> SessionData {
    let mut driver_info = HashMap::new();
    driver_info.insert(
        "44".to_string(),
        driver("HAM", "Lewis", "Hamilton", "Mercedes"),
    );
    driver_info.insert(
        "1".to_string(),
        driver("VER", "Max", "Verstappen", "Red Bull"),
    );

    SessionData {
        event: EventInfo {
            round: 1,
            name: Some("Test GP".to_string()),
            country: Some("Somewhere".to_string()),
            location: Some("Race City".to_string()),
            ..EventInfo::default()
        },
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
        telemetry: Vec::new(),
    }
}

/// Row with a code and times in seconds; NaN marks an undefined cell.
#[allow(dead_code)]
pub fn timed_row(lap: u32, id: &str, position: Option<u32>, lap_time: f64, time: f64) -> LapRow {
    let row = LapRow::new(lap, id)
        .with_code(id)
        .with_lap_time_secs(lap_time)
        .with_session_time_secs(time);
    match position {
        Some(p) => row.with_position(p),
        None => row,
    }
}
