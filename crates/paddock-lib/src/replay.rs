//! Lap-by-lap replay aggregation.
//!
//! Turns the flat per-(lap, driver) table into an ordered timeline with
//! derived inter-car timing. The aggregation is a pure function of its
//! inputs; no provider or HTTP types are involved.
//!
//! # Ordering
//!
//! Rows are grouped by lap number (ascending). Within a lap the whole group
//! is ordered by position when *every* row has one; otherwise the whole
//! group falls back to lap duration ascending, with undefined durations last.
//! Both sorts are stable. The first row of a group is the leader.
//!
//! # Interval reference
//!
//! `interval_to_front_s` compares a row's cumulative time with a reference
//! time taken from the rows ahead of it. Which reference is used is decided
//! by [`IntervalPolicy`].

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::{DriverInfo, LapRow, SessionData, SessionKey};

/// How the "car ahead" reference time is carried through a lap group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalPolicy {
    /// Rows with an undefined cumulative time do not reset the reference:
    /// the last defined time ahead is carried forward.
    #[default]
    CarryLastKnown,
    /// Always compare with the immediately preceding row, so an undefined
    /// time makes the interval of the next row undefined too.
    ImmediatePredecessor,
}

impl FromStr for IntervalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carry-last-known" | "carry" => Ok(Self::CarryLastKnown),
            "immediate-predecessor" | "immediate" => Ok(Self::ImmediatePredecessor),
            other => Err(format!("unknown interval policy '{other}'")),
        }
    }
}

/// Driver metadata resolved from the provider's lookup table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverMeta {
    pub driver_id: String,
    pub code: Option<String>,
    /// First and last name joined by a single space; `None` when both are missing.
    pub name: Option<String>,
    pub team: Option<String>,
}

impl DriverMeta {
    pub fn resolve(driver_id: &str, info: Option<&DriverInfo>) -> Self {
        let name = info.and_then(|info| {
            let parts: Vec<&str> = [info.first_name.as_deref(), info.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        });

        Self {
            driver_id: driver_id.to_string(),
            code: info.and_then(|i| i.abbreviation.clone()),
            name,
            team: info.and_then(|i| i.team_name.clone()),
        }
    }
}

/// Derived timing for one driver on one lap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverTiming {
    pub driver_id: String,
    pub driver_code: Option<String>,
    pub position: Option<u32>,
    pub lap_time_s: Option<f64>,
    pub gap_to_leader_s: Option<f64>,
    pub interval_to_front_s: Option<f64>,
}

/// All drivers' timing for one lap, in running order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapEntry {
    pub lap: u32,
    pub driver_timings: Vec<DriverTiming>,
}

/// Aggregated replay: driver metadata plus the lap timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayTimeline {
    pub drivers: Vec<DriverMeta>,
    pub timeline: Vec<LapEntry>,
}

impl ReplayTimeline {
    pub fn lap_count(&self) -> usize {
        self.timeline.len()
    }
}

/// Build a replay with the default [`IntervalPolicy`].
pub fn build_replay<'a, F>(rows: &[LapRow], driver_list: &[String], lookup: F) -> ReplayTimeline
where
    F: Fn(&str) -> Option<&'a DriverInfo>,
{
    build_replay_with_policy(rows, driver_list, lookup, IntervalPolicy::default())
}

/// Build a replay timeline from raw lap rows.
///
/// An empty row table yields an empty timeline *and* an empty driver list.
pub fn build_replay_with_policy<'a, F>(
    rows: &[LapRow],
    driver_list: &[String],
    lookup: F,
    policy: IntervalPolicy,
) -> ReplayTimeline
where
    F: Fn(&str) -> Option<&'a DriverInfo>,
{
    if rows.is_empty() {
        return ReplayTimeline::default();
    }

    let drivers = driver_list
        .iter()
        .map(|id| DriverMeta::resolve(id, lookup(id)))
        .collect();

    let mut laps: BTreeMap<u32, Vec<&LapRow>> = BTreeMap::new();
    for row in rows {
        laps.entry(row.lap_number).or_default().push(row);
    }

    let timeline = laps
        .into_iter()
        .map(|(lap, mut group)| {
            order_lap_group(&mut group);
            LapEntry {
                lap,
                driver_timings: lap_timings(&group, policy),
            }
        })
        .collect();

    ReplayTimeline { drivers, timeline }
}

/// Order a lap group in place: by position if every row has one, else by lap time.
fn order_lap_group(group: &mut [&LapRow]) {
    if group.iter().all(|row| row.position.is_some()) {
        group.sort_by_key(|row| row.position);
    } else {
        // None sorts last.
        group.sort_by_key(|row| (row.lap_time.is_none(), row.lap_time));
    }
}

fn lap_timings(ordered: &[&LapRow], policy: IntervalPolicy) -> Vec<DriverTiming> {
    let leader_time = ordered.first().and_then(|row| secs(row.session_time));
    let mut reference: Option<f64> = None;

    ordered
        .iter()
        .map(|row| {
            let time = secs(row.session_time);
            let gap_to_leader_s = leader_time.zip(time).map(|(lead, t)| t - lead);
            let interval_to_front_s = reference.zip(time).map(|(ahead, t)| t - ahead);

            reference = match policy {
                IntervalPolicy::CarryLastKnown => time.or(reference),
                IntervalPolicy::ImmediatePredecessor => time,
            };

            DriverTiming {
                driver_id: row.driver_id.clone(),
                driver_code: row.driver_code.clone(),
                position: row.position,
                lap_time_s: secs(row.lap_time),
                gap_to_leader_s,
                interval_to_front_s,
            }
        })
        .collect()
}

fn secs(value: Option<Duration>) -> Option<f64> {
    value.map(|d| d.as_secs_f64())
}

/// Session identification attached to a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayMetadata {
    pub year: i32,
    pub round: u32,
    pub session_code: String,
    pub event_name: Option<String>,
    pub country: Option<String>,
    pub location: Option<String>,
}

/// Replay payload for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReplay {
    pub metadata: ReplayMetadata,
    #[serde(flatten)]
    pub replay: ReplayTimeline,
}

/// Aggregate a loaded session into its replay payload.
pub fn session_replay(
    key: &SessionKey,
    session: &SessionData,
    policy: IntervalPolicy,
) -> SessionReplay {
    let replay = build_replay_with_policy(
        &session.laps,
        &session.drivers,
        |id| session.driver(id),
        policy,
    );

    tracing::debug!(
        session = %key,
        laps = replay.lap_count(),
        drivers = replay.drivers.len(),
        "replay aggregated"
    );

    SessionReplay {
        metadata: ReplayMetadata {
            year: key.year,
            round: key.round,
            session_code: key.session.clone(),
            event_name: session.event.name.clone(),
            country: session.event.country.clone(),
            location: session.event.location.clone(),
        },
        replay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_lookup(_: &str) -> Option<&'static DriverInfo> {
        None
    }

    #[test]
    fn interval_policy_parses_aliases() {
        assert_eq!(
            "carry-last-known".parse::<IntervalPolicy>(),
            Ok(IntervalPolicy::CarryLastKnown)
        );
        assert_eq!(
            "Immediate".parse::<IntervalPolicy>(),
            Ok(IntervalPolicy::ImmediatePredecessor)
        );
        assert!("sideways".parse::<IntervalPolicy>().is_err());
    }

    #[test]
    fn position_order_used_when_complete() {
        let rows = vec![
            LapRow::new(1, "1").with_position(2).with_lap_time_secs(80.0),
            LapRow::new(1, "44").with_position(1).with_lap_time_secs(95.0),
        ];
        let replay = build_replay(&rows, &[], no_lookup);
        let ids: Vec<_> = replay.timeline[0]
            .driver_timings
            .iter()
            .map(|t| t.driver_id.as_str())
            .collect();
        assert_eq!(ids, ["44", "1"]);
    }

    #[test]
    fn undefined_lap_time_sorts_last_in_fallback() {
        let rows = vec![
            LapRow::new(1, "A"),
            LapRow::new(1, "B").with_lap_time_secs(91.0),
            LapRow::new(1, "C").with_position(1).with_lap_time_secs(90.0),
        ];
        let replay = build_replay(&rows, &[], no_lookup);
        let ids: Vec<_> = replay.timeline[0]
            .driver_timings
            .iter()
            .map(|t| t.driver_id.as_str())
            .collect();
        assert_eq!(ids, ["C", "B", "A"]);
    }

    #[test]
    fn leader_has_no_interval_even_with_time() {
        let rows = vec![LapRow::new(3, "44")
            .with_position(1)
            .with_session_time_secs(250.0)];
        let replay = build_replay(&rows, &[], no_lookup);
        let leader = &replay.timeline[0].driver_timings[0];
        assert_eq!(leader.gap_to_leader_s, Some(0.0));
        assert_eq!(leader.interval_to_front_s, None);
    }

    #[test]
    fn leader_without_time_leaves_every_gap_undefined() {
        let rows = vec![
            LapRow::new(1, "44").with_position(1),
            LapRow::new(1, "1")
                .with_position(2)
                .with_session_time_secs(100.0),
            LapRow::new(1, "16")
                .with_position(3)
                .with_session_time_secs(101.5),
        ];
        let replay = build_replay(&rows, &[], no_lookup);
        let timings = &replay.timeline[0].driver_timings;
        assert!(timings.iter().all(|t| t.gap_to_leader_s.is_none()));
        assert_eq!(timings[1].interval_to_front_s, None);
        assert_eq!(timings[2].interval_to_front_s, Some(1.5));
    }

    #[test]
    fn driver_meta_joins_present_name_parts() {
        let info = DriverInfo {
            abbreviation: Some("ZHO".to_string()),
            first_name: None,
            last_name: Some("Zhou".to_string()),
            team_name: None,
        };
        let meta = DriverMeta::resolve("24", Some(&info));
        assert_eq!(meta.name.as_deref(), Some("Zhou"));
        assert_eq!(meta.code.as_deref(), Some("ZHO"));
        assert_eq!(meta.team, None);

        let unknown = DriverMeta::resolve("99", None);
        assert_eq!(unknown.driver_id, "99");
        assert_eq!(unknown.name, None);
    }

    #[test]
    fn session_replay_carries_metadata() {
        let mut info = HashMap::new();
        info.insert(
            "44".to_string(),
            DriverInfo {
                abbreviation: Some("HAM".to_string()),
                ..DriverInfo::default()
            },
        );
        let session = SessionData {
            drivers: vec!["44".to_string()],
            driver_info: info,
            laps: vec![LapRow::new(1, "44").with_code("HAM").with_position(1)],
            ..SessionData::default()
        };
        let key = SessionKey::new(2024, 1, "R");
        let replay = session_replay(&key, &session, IntervalPolicy::default());

        assert_eq!(replay.metadata.year, 2024);
        assert_eq!(replay.metadata.session_code, "R");
        assert_eq!(replay.replay.drivers[0].code.as_deref(), Some("HAM"));

        let json = serde_json::to_value(&replay).unwrap();
        assert!(json.get("drivers").is_some());
        assert!(json.get("timeline").is_some());
        assert!(json.get("replay").is_none());
    }
}
