//! Export document: the full serialisable state of a run.
//!
//! RULE: The export is the only way state leaves or enters an engine.
//! Import is strict: a document that cannot describe a consistent state
//! fails with MalformedState instead of being patched up.
//!
//! RNG state and scheduler tallies are not part of the document. A loaded
//! engine reseeds from its config.

use crate::{
    error::{SimError, SimResult},
    event::Event,
    state::{
        Employee, OrgState, Vacancy, DEPARTMENT_PREFIX, EMPLOYEE_ID_PREFIX,
        PLACEHOLDER_ID_PREFIX, TEAM_PREFIX,
    },
    types::{iso_date, SimDate},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimExport {
    pub employees:      Vec<Employee>,
    #[serde(default)]
    pub temp_employees: Vec<Employee>,
    #[serde(default)]
    pub vacancies:      Vec<Vacancy>,
    pub event_log:      Vec<Event>,
    #[serde(with = "iso_date")]
    pub start_date:     SimDate,
    #[serde(with = "iso_date")]
    pub current_date:   SimDate,
}

impl SimExport {
    pub fn capture(state: &OrgState) -> Self {
        Self {
            employees:      state.employees.iter().cloned().collect(),
            temp_employees: state.placeholders.iter().cloned().collect(),
            vacancies:      state.vacancies.clone(),
            event_log:      state.event_log.clone(),
            start_date:     state.clock.start_date,
            current_date:   state.clock.today,
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SimError::malformed(format!("unreadable export document: {e}")))
    }

    /// Rebuild an OrgState. Id and name counters continue from the highest
    /// suffix seen anywhere in the document.
    pub fn into_state(self) -> SimResult<OrgState> {
        if self.current_date < self.start_date {
            return Err(SimError::malformed(format!(
                "current_date {} is before start_date {}",
                self.current_date, self.start_date
            )));
        }

        let mut state = OrgState::new(self.start_date);
        state.clock.today = self.current_date;

        let mut max_id = 0u64;
        for employee in self.employees {
            max_id = max_id.max(id_sequence(&employee, EMPLOYEE_ID_PREFIX)?);
            let id = employee.id.clone();
            if !state.employees.insert(employee) {
                return Err(SimError::malformed(format!("duplicate employee id {id}")));
            }
        }
        for placeholder in self.temp_employees {
            max_id = max_id.max(id_sequence(&placeholder, PLACEHOLDER_ID_PREFIX)?);
            if placeholder.active {
                return Err(SimError::malformed(format!(
                    "placeholder {} is marked active",
                    placeholder.id
                )));
            }
            let id = placeholder.id.clone();
            if state.employees.contains(&id) || !state.placeholders.insert(placeholder) {
                return Err(SimError::malformed(format!("duplicate employee id {id}")));
            }
        }
        for event in &self.event_log {
            if !state.employees.contains(&event.employee_id) {
                return Err(SimError::malformed(format!(
                    "event log references unknown employee {}",
                    event.employee_id
                )));
            }
        }

        state.vacancies = self.vacancies;
        state.event_log = self.event_log;

        let departments = max_name_suffix(&state, DEPARTMENT_PREFIX, |d, _| d);
        let teams = max_name_suffix(&state, TEAM_PREFIX, |_, t| t);
        state.restore_counters(max_id, departments, teams);
        Ok(state)
    }
}

/// Numeric suffix of an id with the expected prefix. The history must be
/// non-empty: every employee starts with an Employed event.
fn id_sequence(employee: &Employee, prefix: &str) -> SimResult<u64> {
    if employee.history.is_empty() {
        return Err(SimError::malformed(format!("{} has an empty history", employee.id)));
    }
    employee
        .id
        .strip_prefix(prefix)
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .ok_or_else(|| {
            SimError::malformed(format!("id {} does not match {prefix}<number>", employee.id))
        })
}

/// Highest N among generated unit names "<prefix>N" on employees,
/// placeholders, vacancies and logged events.
fn max_name_suffix<'a>(
    state: &'a OrgState,
    prefix: &str,
    pick: impl Fn(Option<&'a String>, Option<&'a String>) -> Option<&'a String>,
) -> u64 {
    let people = state
        .employees
        .iter()
        .chain(state.placeholders.iter())
        .map(|e| pick(e.department.as_ref(), e.team.as_ref()));
    let open = state
        .vacancies
        .iter()
        .map(|v| pick(v.department.as_ref(), v.team.as_ref()));
    let logged = state
        .event_log
        .iter()
        .map(|e| pick(e.department.as_ref(), e.team.as_ref()));

    people
        .chain(open)
        .chain(logged)
        .flatten()
        .filter_map(|name| name.strip_prefix(prefix)?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}
