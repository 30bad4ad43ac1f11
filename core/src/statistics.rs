//! Run statistics: scalar summaries derived from a finished (or paused) run.
//!
//! RULE: Statistics read the event log and the active roster only. They
//! never mutate state, so they can be computed at any point of a run.
//! Placeholders never enter the log and so never count here.

use crate::{
    config::SimConfig,
    event::Event,
    state::OrgState,
    types::{iso_date, EventType, Role, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimStatistics {
    pub total_num_hired:              u64,
    pub total_num_left:               u64,
    pub total_num_promoted:           u64,
    /// Day offset at which headcount first reached max_employees, -1 if never.
    pub org_saturation_day:           i64,
    pub vp_team_size_skew:            f64,
    pub director_team_size_skew:      f64,
    pub manager_team_size_skew:       f64,
    pub mean_days_between_hires:      f64,
    pub mean_days_between_promotions: f64,
    pub mean_days_between_leavings:   f64,
}

impl SimStatistics {
    pub fn compute(state: &OrgState, config: &SimConfig) -> Self {
        let log = &state.event_log;
        Self {
            total_num_hired:              count_events(log, EventType::Employed),
            total_num_left:               count_events(log, EventType::Left),
            total_num_promoted:           count_events(log, EventType::Promoted),
            org_saturation_day:           saturation_day(state, config.max_employees),
            vp_team_size_skew:            team_size_skew(state, Role::Vp),
            director_team_size_skew:      team_size_skew(state, Role::Director),
            manager_team_size_skew:       team_size_skew(state, Role::Manager),
            mean_days_between_hires:      mean_days_between(log, EventType::Employed),
            mean_days_between_promotions: mean_days_between(log, EventType::Promoted),
            mean_days_between_leavings:   mean_days_between(log, EventType::Left),
        }
    }

    /// Flat key → number view, the shape batch drivers and the store consume.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        [
            ("total_num_hired", self.total_num_hired as f64),
            ("total_num_left", self.total_num_left as f64),
            ("total_num_promoted", self.total_num_promoted as f64),
            ("org_saturation_day", self.org_saturation_day as f64),
            ("vp_team_size_skew", self.vp_team_size_skew),
            ("director_team_size_skew", self.director_team_size_skew),
            ("manager_team_size_skew", self.manager_team_size_skew),
            ("mean_days_between_hires", self.mean_days_between_hires),
            ("mean_days_between_promotions", self.mean_days_between_promotions),
            ("mean_days_between_leavings", self.mean_days_between_leavings),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// One row of the daily activity series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    #[serde(with = "iso_date")]
    pub date:      SimDate,
    pub hired:     u32,
    pub promoted:  u32,
    pub left:      u32,
    pub changes:   u32,
    /// Active headcount at the end of the day.
    pub headcount: i64,
}

/// Per-day event counts for every date that has at least one event, in
/// date order, with the running headcount.
pub fn daily_activity(state: &OrgState) -> Vec<DailyActivity> {
    let mut by_day: BTreeMap<SimDate, DailyActivity> = BTreeMap::new();
    for event in &state.event_log {
        let row = by_day.entry(event.date).or_insert_with(|| DailyActivity {
            date:      event.date,
            hired:     0,
            promoted:  0,
            left:      0,
            changes:   0,
            headcount: 0,
        });
        match event.event_type {
            EventType::Employed => row.hired += 1,
            EventType::Promoted => row.promoted += 1,
            EventType::Left     => row.left += 1,
            EventType::Change   => row.changes += 1,
        }
    }

    let mut running = 0i64;
    by_day
        .into_values()
        .map(|mut row| {
            running += i64::from(row.hired) - i64::from(row.left);
            row.headcount = running;
            row
        })
        .collect()
}

fn count_events(log: &[Event], kind: EventType) -> u64 {
    log.iter().filter(|e| e.event_type == kind).count() as u64
}

fn saturation_day(state: &OrgState, max_employees: u32) -> i64 {
    daily_activity(state)
        .into_iter()
        .find(|row| row.headcount >= i64::from(max_employees))
        .map_or(-1, |row| state.clock.day_offset(row.date))
}

/// Mean ÷ median of direct-report counts over active managers of `role`.
fn team_size_skew(state: &OrgState, role: Role) -> f64 {
    let sizes: Vec<f64> = state
        .active_employees()
        .filter(|e| e.role == role)
        .map(|m| state.direct_reports(&m.id).len() as f64)
        .collect();
    let Some(median) = median(&sizes) else {
        return 0.0;
    };
    if median == 0.0 {
        return 0.0;
    }
    let mean = sizes.iter().sum::<f64>() / sizes.len() as f64;
    round_to(mean / median, 3)
}

fn mean_days_between(log: &[Event], kind: EventType) -> f64 {
    let mut dates: Vec<SimDate> = log
        .iter()
        .filter(|e| e.event_type == kind)
        .map(|e| e.date)
        .collect();
    if dates.len() < 2 {
        return 0.0;
    }
    dates.sort_unstable();
    let total: i64 = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).sum();
    round_to(total as f64 / (dates.len() - 1) as f64, 2)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_and_odd_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn rounding_matches_reported_precision() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
    }

    #[test]
    fn mean_gap_needs_two_events() {
        let day = |d| SimDate::from_ymd_opt(2025, 1, d).unwrap();
        let event = |date| Event {
            date,
            event_type:  EventType::Employed,
            employee_id: "EMP001".into(),
            role:        Role::Analyst,
            manager_id:  None,
            department:  None,
            team:        None,
        };
        assert_eq!(mean_days_between(&[event(day(1))], EventType::Employed), 0.0);
        let log = [event(day(1)), event(day(4)), event(day(5))];
        assert_eq!(mean_days_between(&log, EventType::Employed), 2.0);
        assert_eq!(mean_days_between(&log, EventType::Left), 0.0);
    }
}
