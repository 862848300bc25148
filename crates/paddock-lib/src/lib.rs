//! Paddock library entry points.
//!
//! This crate exposes the session-data provider abstraction, the lap-by-lap
//! replay aggregator, track map selection and calendar formatting. The HTTP
//! services only depend on the functions exported here instead of
//! reimplementing behavior.
//!

pub mod disk;
pub mod error;
pub mod events;
pub mod provider;
pub mod replay;
pub mod session;
pub mod track;

pub use disk::{default_data_dir, DiskProvider};
pub use error::{Error, Result};
pub use events::{
    current_and_previous_seasons, season_summaries, session_code, EventDetail, EventSummary,
    SessionSlot,
};
pub use provider::{MemoryProvider, SessionProvider};
pub use replay::{
    build_replay, build_replay_with_policy, session_replay, DriverMeta, DriverTiming,
    IntervalPolicy, LapEntry, ReplayMetadata, ReplayTimeline, SessionReplay,
};
pub use session::{
    DriverInfo, EventInfo, LapRow, LapTelemetry, Polyline, ScheduledSession, SessionData,
    SessionKey,
};
pub use track::{fastest_lap, track_map, TrackMap};
