use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Paddock library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider data directory could not be located.
    #[error("session data directory not found at {path}")]
    DataDirNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the session data cache")]
    ProjectDirsUnavailable,

    /// The season calendar could not be fetched or decoded.
    #[error("unable to load schedule for {year}: {message}")]
    ScheduleUnavailable { year: i32, message: String },

    /// The requested round is not part of the season calendar.
    #[error("unable to load event for {year} round {round}")]
    EventNotFound { year: i32, round: u32 },

    /// The requested session could not be loaded.
    #[error("unable to load session {year} round {round} ({session})")]
    SessionNotFound {
        year: i32,
        round: u32,
        session: String,
    },

    /// The session contains no laps for the requested driver.
    #[error("no laps found for driver {driver}")]
    DriverLapsNotFound { driver: String },

    /// No timed lap could be selected for the session or driver.
    #[error("no lap found for the specified session/driver")]
    LapNotFound,

    /// Position telemetry is missing for the selected lap.
    #[error("telemetry is not available for lap {lap} of driver {driver}")]
    TelemetryUnavailable { driver: String, lap: u32 },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
