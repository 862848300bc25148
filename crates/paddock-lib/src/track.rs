//! Track map polylines taken from a fastest lap's position telemetry.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::session::{LapRow, Polyline, SessionData, SessionKey};

/// Track map payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMap {
    pub year: i32,
    pub round: u32,
    pub session_code: String,
    /// Requested driver code, or the code of the overall fastest lap's driver.
    pub driver: Option<String>,
    pub polyline: Polyline,
}

/// Fastest timed lap among `laps`. Laps without a lap time are ignored.
pub fn fastest_lap<'a>(laps: impl IntoIterator<Item = &'a LapRow>) -> Option<&'a LapRow> {
    laps.into_iter()
        .filter(|lap| lap.lap_time.is_some())
        .min_by_key(|lap| lap.lap_time)
}

/// Build the track map for a driver's fastest lap, or the session's overall fastest lap.
///
/// `driver_code` is matched against the lap rows' driver codes exactly; callers
/// normalize case beforehand.
pub fn track_map(
    key: &SessionKey,
    session: &SessionData,
    driver_code: Option<&str>,
) -> Result<TrackMap> {
    let lap = match driver_code {
        Some(code) => {
            let mut laps = session
                .laps
                .iter()
                .filter(|lap| lap.driver_code.as_deref() == Some(code))
                .peekable();
            if laps.peek().is_none() {
                return Err(Error::DriverLapsNotFound {
                    driver: code.to_string(),
                });
            }
            fastest_lap(laps)
        }
        None => fastest_lap(&session.laps),
    }
    .ok_or(Error::LapNotFound)?;

    let polyline = session
        .lap_telemetry(&lap.driver_id, lap.lap_number)
        .cloned()
        .ok_or_else(|| Error::TelemetryUnavailable {
            driver: lap.driver_id.clone(),
            lap: lap.lap_number,
        })?;

    tracing::debug!(
        session = %key,
        driver = %lap.driver_id,
        lap = lap.lap_number,
        points = polyline.x.len(),
        "selected fastest lap for track map"
    );

    Ok(TrackMap {
        year: key.year,
        round: key.round,
        session_code: key.session.clone(),
        driver: driver_code
            .map(String::from)
            .or_else(|| lap.driver_code.clone()),
        polyline,
    })
}
