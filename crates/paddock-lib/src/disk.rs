//! Provider reading a session-data cache directory.
//!
//! Layout:
//!
//! ```text
//! <root>/<year>/schedule.json          calendar: [EventInfo, ...]
//! <root>/<year>/<round>/<CODE>.json    one session table
//! ```
//!
//! Session files carry the provider's raw columns. Cells are decoded
//! leniently: `null`, `NaN`, `NaT`, unparseable strings and out-of-range
//! numbers become undefined instead of failing the whole load. Rows whose lap
//! number is undefined are dropped, as they cannot be grouped into a lap.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::provider::SessionProvider;
use crate::session::{
    duration_from_secs, DriverInfo, EventInfo, LapRow, LapTelemetry, SessionData, SessionKey,
};

const SCHEDULE_FILENAME: &str = "schedule.json";

/// Default cache location, `<platform data dir>/sessions`.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "paddock", "paddock").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join("sessions"))
}

/// [`SessionProvider`] over an on-disk cache directory.
#[derive(Debug, Clone)]
pub struct DiskProvider {
    root: PathBuf,
}

impl DiskProvider {
    /// Open a cache directory. The directory must exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::DataDirNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn schedule_path(&self, year: i32) -> PathBuf {
        self.root.join(year.to_string()).join(SCHEDULE_FILENAME)
    }

    fn session_path(&self, key: &SessionKey) -> Option<PathBuf> {
        // The session code becomes a file name; anything but a plain token is rejected.
        if key.session.is_empty() || !key.session.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(
            self.root
                .join(key.year.to_string())
                .join(key.round.to_string())
                .join(format!("{}.json", key.session.to_ascii_uppercase())),
        )
    }

    fn load_session(&self, key: &SessionKey, path: &Path) -> Result<SessionData> {
        let raw = fs::read_to_string(path)?;
        let file: SessionFile = serde_json::from_str(&raw)?;

        let event = match file.event {
            Some(event) => event,
            None => self.event(key.year, key.round).unwrap_or(EventInfo {
                round: key.round,
                ..EventInfo::default()
            }),
        };

        let total_rows = file.laps.len();
        let laps: Vec<LapRow> = file.laps.iter().filter_map(RawLapRow::decode).collect();
        if laps.len() < total_rows {
            debug!(
                session = %key,
                dropped = total_rows - laps.len(),
                "dropped lap rows without a lap number"
            );
        }

        Ok(SessionData {
            event,
            drivers: file.drivers.iter().filter_map(cell_str).collect(),
            driver_info: file.driver_info,
            laps,
            telemetry: file.telemetry,
        })
    }
}

impl SessionProvider for DiskProvider {
    fn available_seasons(&self) -> Result<Vec<i32>> {
        let mut seasons: Vec<i32> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().join(SCHEDULE_FILENAME).is_file())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        seasons.sort_unstable();
        Ok(seasons)
    }

    fn season_schedule(&self, year: i32) -> Result<Vec<EventInfo>> {
        let path = self.schedule_path(year);
        let load = || -> Result<Vec<EventInfo>> {
            let raw = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&raw)?)
        };
        load().map_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to load schedule");
            Error::ScheduleUnavailable {
                year,
                message: e.to_string(),
            }
        })
    }

    fn event(&self, year: i32, round: u32) -> Result<EventInfo> {
        self.season_schedule(year)
            .ok()
            .and_then(|events| events.into_iter().find(|e| e.round == round))
            .ok_or(Error::EventNotFound { year, round })
    }

    fn session(&self, key: &SessionKey) -> Result<SessionData> {
        let not_found = || Error::SessionNotFound {
            year: key.year,
            round: key.round,
            session: key.session.clone(),
        };

        let path = self.session_path(key).ok_or_else(not_found)?;
        debug!(session = %key, path = %path.display(), "loading session");

        self.load_session(key, &path).map_err(|e| {
            warn!(session = %key, path = %path.display(), error = %e, "failed to load session");
            not_found()
        })
    }
}

/// On-disk session table.
#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default)]
    event: Option<EventInfo>,
    #[serde(default)]
    drivers: Vec<Value>,
    #[serde(default)]
    driver_info: HashMap<String, DriverInfo>,
    #[serde(default)]
    laps: Vec<RawLapRow>,
    #[serde(default)]
    telemetry: Vec<LapTelemetry>,
}

/// One undecoded lap row; every cell may hold anything.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLapRow {
    lap_number: Value,
    driver_number: Value,
    driver: Value,
    position: Value,
    lap_time: Value,
    time: Value,
}

impl RawLapRow {
    fn decode(&self) -> Option<LapRow> {
        Some(LapRow {
            lap_number: cell_ordinal(&self.lap_number)?,
            driver_id: cell_str(&self.driver_number).unwrap_or_default(),
            driver_code: cell_str(&self.driver),
            position: cell_ordinal(&self.position),
            lap_time: cell_seconds(&self.lap_time).and_then(duration_from_secs),
            session_time: cell_seconds(&self.time).and_then(duration_from_secs),
        })
    }
}

fn is_missing_token(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "" | "nan" | "nat" | "none" | "null"
    )
}

/// Text cell. Integral numbers are rendered without a fractional part.
fn cell_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !is_missing_token(s) => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| if f.fract() == 0.0 { format!("{f:.0}") } else { f.to_string() })
            }
        }
        _ => None,
    }
}

/// Numeric cell in seconds; NaN stays NaN and is rejected by the duration conversion.
fn cell_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Positive whole number (lap numbers, positions).
fn cell_ordinal(value: &Value) -> Option<u32> {
    let n = cell_seconds(value)?;
    if n.is_finite() && n >= 1.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}
