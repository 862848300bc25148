//! Session data as handed over by a [`SessionProvider`](crate::SessionProvider).
//!
//! These types mirror the provider's tabular output: one [`LapRow`] per
//! (lap, driver) observation, a driver lookup table, event metadata and
//! per-lap position telemetry. Every cell the provider may report as missing
//! is an `Option`; there are no sentinel values.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifies one session of one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub year: i32,
    pub round: u32,
    pub session: String,
}

impl SessionKey {
    pub fn new(year: i32, round: u32, session: impl Into<String>) -> Self {
        Self {
            year,
            round,
            session: session.into(),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} round {} ({})", self.year, self.round, self.session)
    }
}

/// One scheduled session slot of an event (`Session1` .. `Session5`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    /// Human-readable name, e.g. "Practice 1". Blank slots are skipped.
    #[serde(default)]
    pub name: Option<String>,
    /// Session start in UTC, ISO-8601.
    #[serde(default)]
    pub date_utc: Option<String>,
}

/// One row of the season calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub round: u32,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub official_name: Option<String>,
    /// "conventional", "sprint", ...
    #[serde(default)]
    pub event_format: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub f1_api_support: bool,
    /// Session slots in calendar order.
    #[serde(default)]
    pub sessions: Vec<ScheduledSession>,
}

/// Driver lookup entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// One (lap number, driver) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LapRow {
    pub lap_number: u32,
    /// Driver (car) number as reported by the provider.
    pub driver_id: String,
    /// Three-letter driver code.
    pub driver_code: Option<String>,
    pub position: Option<u32>,
    pub lap_time: Option<Duration>,
    /// Cumulative session time when the lap was completed.
    pub session_time: Option<Duration>,
}

impl LapRow {
    pub fn new(lap_number: u32, driver_id: impl Into<String>) -> Self {
        Self {
            lap_number,
            driver_id: driver_id.into(),
            driver_code: None,
            position: None,
            lap_time: None,
            session_time: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.driver_code = Some(code.into());
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = (position > 0).then_some(position);
        self
    }

    /// Set the lap duration from seconds. NaN or negative values leave it undefined.
    pub fn with_lap_time_secs(mut self, secs: f64) -> Self {
        self.lap_time = duration_from_secs(secs);
        self
    }

    /// Set the cumulative session time from seconds. NaN or negative values leave it undefined.
    pub fn with_session_time_secs(mut self, secs: f64) -> Self {
        self.session_time = duration_from_secs(secs);
        self
    }
}

/// Convert provider seconds into a duration, mapping not-a-value to `None`.
pub fn duration_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// X/Y position trace of one lap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Polyline {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }
}

/// Position telemetry for one driver's lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTelemetry {
    pub driver_id: String,
    pub lap_number: u32,
    #[serde(flatten)]
    pub polyline: Polyline,
}

/// Everything the provider knows about a loaded session.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub event: EventInfo,
    /// Driver numbers in the provider's order.
    pub drivers: Vec<String>,
    pub driver_info: HashMap<String, DriverInfo>,
    pub laps: Vec<LapRow>,
    pub telemetry: Vec<LapTelemetry>,
}

impl SessionData {
    pub fn driver(&self, driver_id: &str) -> Option<&DriverInfo> {
        self.driver_info.get(driver_id)
    }

    /// Position trace for a lap, if the provider recorded a non-empty one.
    pub fn lap_telemetry(&self, driver_id: &str, lap_number: u32) -> Option<&Polyline> {
        self.telemetry
            .iter()
            .find(|t| t.driver_id == driver_id && t.lap_number == lap_number)
            .map(|t| &t.polyline)
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_and_negative_seconds_are_undefined() {
        assert_eq!(duration_from_secs(f64::NAN), None);
        assert_eq!(duration_from_secs(-1.0), None);
        assert_eq!(duration_from_secs(f64::INFINITY), None);
        assert_eq!(duration_from_secs(1.5), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn zero_position_is_undefined() {
        let row = LapRow::new(1, "44").with_position(0);
        assert_eq!(row.position, None);
    }

    #[test]
    fn empty_telemetry_is_not_returned() {
        let session = SessionData {
            telemetry: vec![LapTelemetry {
                driver_id: "44".to_string(),
                lap_number: 3,
                polyline: Polyline::default(),
            }],
            ..SessionData::default()
        };
        assert!(session.lap_telemetry("44", 3).is_none());
    }

    #[test]
    fn session_key_display() {
        let key = SessionKey::new(2024, 5, "R");
        assert_eq!(key.to_string(), "2024 round 5 (R)");
    }
}
