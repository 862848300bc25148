//! Session-data provider abstraction.
//!
//! A provider loads calendars and session tables from wherever they live and
//! owns its own caching. Calls may block on disk or network I/O; async
//! callers should run them on a blocking worker.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::session::{EventInfo, SessionData, SessionKey};

/// Source of calendar and session data.
pub trait SessionProvider: Send + Sync {
    /// Seasons the provider can serve, ascending.
    fn available_seasons(&self) -> Result<Vec<i32>>;

    /// Full calendar for a season. Fails with [`Error::ScheduleUnavailable`].
    fn season_schedule(&self, year: i32) -> Result<Vec<EventInfo>>;

    /// One calendar entry. Fails with [`Error::EventNotFound`].
    fn event(&self, year: i32, round: u32) -> Result<EventInfo>;

    /// Load a session's tables. Fails with [`Error::SessionNotFound`].
    fn session(&self, key: &SessionKey) -> Result<SessionData>;
}

/// Provider backed by in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    schedules: BTreeMap<i32, Vec<EventInfo>>,
    sessions: HashMap<SessionKey, SessionData>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, year: i32, events: Vec<EventInfo>) -> Self {
        self.schedules.insert(year, events);
        self
    }

    pub fn with_session(mut self, key: SessionKey, session: SessionData) -> Self {
        self.sessions.insert(key, session);
        self
    }
}

impl SessionProvider for MemoryProvider {
    fn available_seasons(&self) -> Result<Vec<i32>> {
        Ok(self.schedules.keys().copied().collect())
    }

    fn season_schedule(&self, year: i32) -> Result<Vec<EventInfo>> {
        self.schedules
            .get(&year)
            .cloned()
            .ok_or_else(|| Error::ScheduleUnavailable {
                year,
                message: "no calendar loaded".to_string(),
            })
    }

    fn event(&self, year: i32, round: u32) -> Result<EventInfo> {
        self.schedules
            .get(&year)
            .and_then(|events| events.iter().find(|e| e.round == round))
            .cloned()
            .ok_or(Error::EventNotFound { year, round })
    }

    fn session(&self, key: &SessionKey) -> Result<SessionData> {
        self.sessions
            .get(key)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound {
                year: key.year,
                round: key.round,
                session: key.session.clone(),
            })
    }
}
