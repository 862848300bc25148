//! Calendar and event formatting.

use chrono::Datelike;
use serde::Serialize;

use crate::session::EventInfo;

/// Map provider session names to the short codes used in URLs.
const SESSION_NAME_TO_CODE: &[(&str, &str)] = &[
    ("Practice 1", "FP1"),
    ("Practice 2", "FP2"),
    ("Practice 3", "FP3"),
    ("Free Practice 1", "FP1"),
    ("Free Practice 2", "FP2"),
    ("Free Practice 3", "FP3"),
    ("Qualifying", "Q"),
    ("Race", "R"),
    ("Sprint", "S"),
    ("Sprint Qualifying", "SQ"),
    ("Sprint Shootout", "SQ"),
];

/// Short URL code for a session name, e.g. "Practice 1" -> "FP1".
pub fn session_code(name: &str) -> Option<&'static str> {
    SESSION_NAME_TO_CODE
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, code)| *code)
}

/// The season containing `today` and the one before it.
pub fn current_and_previous_seasons(today: impl Datelike) -> [i32; 2] {
    let year = today.year();
    [year, year - 1]
}

/// Event as listed in a season calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub year: i32,
    pub round: u32,
    pub country: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub official_name: Option<String>,
    pub event_format: Option<String>,
    pub event_date: Option<String>,
    pub f1_api_support: bool,
}

impl EventSummary {
    pub fn from_event(year: i32, event: &EventInfo) -> Self {
        Self {
            year,
            round: event.round,
            country: event.country.clone(),
            location: event.location.clone(),
            name: event.name.clone(),
            official_name: event.official_name.clone(),
            event_format: event.event_format.clone(),
            event_date: event.event_date.clone(),
            f1_api_support: event.f1_api_support,
        }
    }
}

/// One session of an event weekend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSlot {
    /// 1-based calendar slot.
    pub index: usize,
    pub name: String,
    pub code: Option<&'static str>,
    pub start_utc: Option<String>,
}

/// Event with its session list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub sessions: Vec<SessionSlot>,
}

impl EventDetail {
    pub fn from_event(year: i32, event: &EventInfo) -> Self {
        let sessions = event
            .sessions
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let name = slot.name.as_deref().filter(|n| !n.trim().is_empty())?;
                Some(SessionSlot {
                    index: i + 1,
                    name: name.to_string(),
                    code: session_code(name),
                    start_utc: slot.date_utc.clone(),
                })
            })
            .collect();

        Self {
            summary: EventSummary::from_event(year, event),
            sessions,
        }
    }
}

/// Summaries for a whole calendar.
pub fn season_summaries(year: i32, events: &[EventInfo]) -> Vec<EventSummary> {
    events
        .iter()
        .map(|event| EventSummary::from_event(year, event))
        .collect()
}
