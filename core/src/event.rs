//! The event log record.
//!
//! RULE: Every attribute change on an employee is recorded as exactly one
//! Event. An Event is a full snapshot of the subject after the change,
//! so the log alone is enough to rebuild the org chart at any date.

use crate::types::{iso_date, EmployeeId, EventType, Role, SimDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(with = "iso_date")]
    pub date:        SimDate,
    pub event_type:  EventType,
    pub employee_id: EmployeeId,
    pub role:        Role,
    #[serde(default)]
    pub manager_id:  Option<EmployeeId>,
    #[serde(default)]
    pub department:  Option<String>,
    #[serde(default)]
    pub team:        Option<String>,
}
