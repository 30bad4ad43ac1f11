//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One simulated calendar day.
pub type SimDate = chrono::NaiveDate;

/// A stable, unique identifier for an employee or placeholder.
pub type EmployeeId = String;

/// Organisational rank. Declaration order is the seniority order:
/// `Role::Ceo` is level 0, `Role::Analyst` is level 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "CEO")]
    Ceo = 0,
    #[serde(rename = "VP")]
    Vp = 1,
    Director = 2,
    Manager = 3,
    #[serde(rename = "Senior Analyst")]
    SeniorAnalyst = 4,
    Analyst = 5,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Ceo,
        Role::Vp,
        Role::Director,
        Role::Manager,
        Role::SeniorAnalyst,
        Role::Analyst,
    ];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn is_more_senior_than(self, other: Role) -> bool {
        self.level() < other.level()
    }

    /// Roles that open subordinate vacancies when hired.
    pub fn is_managerial(self) -> bool {
        matches!(self, Role::Ceo | Role::Vp | Role::Director | Role::Manager)
    }

    /// Only sub-VP roles carry a department and team.
    pub fn carries_structure(self) -> bool {
        !matches!(self, Role::Ceo | Role::Vp)
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Ceo           => "CEO",
            Role::Vp            => "VP",
            Role::Director      => "Director",
            Role::Manager       => "Manager",
            Role::SeniorAnalyst => "Senior Analyst",
            Role::Analyst       => "Analyst",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// The four kinds of state mutation. Every change is logged as exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Employed,
    Left,
    Promoted,
    Change,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Employed,
        EventType::Left,
        EventType::Promoted,
        EventType::Change,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventType::Employed => "employed",
            EventType::Left     => "left",
            EventType::Promoted => "promoted",
            EventType::Change   => "change",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown event type '{s}'"))
    }
}

/// Serde adapter for simulated dates.
///
/// Writes `YYYY-MM-DD`. Reads either a plain date or an ISO date-time
/// (older exports stored midnight timestamps); the time part is dropped.
pub mod iso_date {
    use super::SimDate;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const DATE_FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &SimDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SimDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<SimDate, String> {
        if let Ok(date) = SimDate::parse_from_str(raw, DATE_FORMAT) {
            return Ok(date);
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| dt.date())
            .map_err(|e| format!("invalid ISO-8601 date '{raw}': {e}"))
    }
}
