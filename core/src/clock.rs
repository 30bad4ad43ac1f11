//! Simulation clock: owns the calendar. One tick = one day.

use crate::types::{iso_date, SimDate};
use chrono::{Datelike, Duration, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimClock {
    #[serde(with = "iso_date")]
    pub start_date: SimDate,
    #[serde(with = "iso_date")]
    pub today:      SimDate,
}

impl SimClock {
    pub fn new(start_date: SimDate) -> Self {
        Self { start_date, today: start_date }
    }

    /// Advance one day. Returns the new date.
    pub fn advance(&mut self) -> SimDate {
        self.today += Duration::days(1);
        self.today
    }

    /// Whole days elapsed since the start date.
    pub fn day_offset(&self, date: SimDate) -> i64 {
        (date - self.start_date).num_days()
    }

    /// Weeks begin on Monday.
    pub fn is_week_start(date: SimDate) -> bool {
        date.weekday() == Weekday::Mon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_one_day() {
        let start = SimDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut clock = SimClock::new(start);
        let next = clock.advance();
        assert_eq!(next, SimDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(clock.day_offset(next), 1);
    }

    #[test]
    fn mondays_start_weeks() {
        // 2025-01-06 was a Monday.
        assert!(SimClock::is_week_start(SimDate::from_ymd_opt(2025, 1, 6).unwrap()));
        assert!(!SimClock::is_week_start(SimDate::from_ymd_opt(2025, 1, 7).unwrap()));
    }
}
