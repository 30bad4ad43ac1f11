//! Organisation state: the registries every rule module reads and writes.
//!
//! RULE: Employees are never removed, only deactivated.
//! RULE: Registries iterate in insertion order. Rule modules that pick
//! "the first match" rely on this for reproducible runs.

use crate::{
    clock::SimClock,
    event::Event,
    types::{iso_date, EmployeeId, EventType, Role, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const EMPLOYEE_ID_PREFIX: &str = "EMP";
pub const PLACEHOLDER_ID_PREFIX: &str = "TEMP";
pub const DEPARTMENT_PREFIX: &str = "Department ";
pub const TEAM_PREFIX: &str = "Team ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(alias = "emp_id")]
    pub id:         EmployeeId,
    pub role:       Role,
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub team:       Option<String>,
    #[serde(with = "iso_date")]
    pub hire_date:  SimDate,
    pub active:     bool,
    pub history:    Vec<Event>,
}

impl Employee {
    /// New employee whose history starts with an Employed event.
    pub fn create(
        id: EmployeeId,
        role: Role,
        hire_date: SimDate,
        manager_id: Option<EmployeeId>,
        department: Option<String>,
        team: Option<String>,
    ) -> Self {
        let mut employee = Self {
            id,
            role,
            manager_id,
            department,
            team,
            hire_date,
            active: true,
            history: Vec::with_capacity(4),
        };
        let hired = employee.snapshot(EventType::Employed, hire_date);
        employee.history.push(hired);
        employee
    }

    fn snapshot(&self, event_type: EventType, date: SimDate) -> Event {
        Event {
            date,
            event_type,
            employee_id: self.id.clone(),
            role:        self.role,
            manager_id:  self.manager_id.clone(),
            department:  self.department.clone(),
            team:        self.team.clone(),
        }
    }

    fn record(&mut self, event_type: EventType, date: SimDate) -> Event {
        let event = self.snapshot(event_type, date);
        self.history.push(event.clone());
        event
    }

    /// Change role. CEO and VP roles drop department and team.
    pub fn promote(&mut self, new_role: Role, date: SimDate) -> Event {
        self.role = new_role;
        if !new_role.carries_structure() {
            self.department = None;
            self.team = None;
        }
        self.record(EventType::Promoted, date)
    }

    pub fn change_manager(&mut self, new_manager_id: EmployeeId, date: SimDate) -> Event {
        self.manager_id = Some(new_manager_id);
        self.record(EventType::Change, date)
    }

    pub fn leave(&mut self, date: SimDate) -> Event {
        self.active = false;
        self.record(EventType::Left, date)
    }

    /// Days since hire, plus one so same-day hires still carry weight.
    pub fn tenure_weight(&self, date: SimDate) -> u64 {
        ((date - self.hire_date).num_days() + 1).max(1) as u64
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_ID_PREFIX)
    }

    /// Placeholders stand in for a vacant slot, so they count as present
    /// for reporting purposes even though they are never active.
    pub fn can_hold_reports(&self) -> bool {
        self.active || self.is_placeholder()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    pub role:        Role,
    /// Who the new occupant reports to.
    #[serde(default)]
    pub manager_id:  Option<EmployeeId>,
    #[serde(default)]
    pub department:  Option<String>,
    #[serde(default)]
    pub team:        Option<String>,
    /// Employees moved to the new occupant once the slot is filled.
    pub report_ids:  Vec<EmployeeId>,
    #[serde(with = "iso_date")]
    pub deadline:    SimDate,
    /// Placeholder currently holding `report_ids`, if one was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interim_manager_id: Option<EmployeeId>,
}

impl Vacancy {
    pub fn is_expired(&self, date: SimDate) -> bool {
        date > self.deadline
    }
}

/// Insertion-ordered employee registry with id lookup.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    items: Vec<Employee>,
    index: HashMap<EmployeeId, usize>,
}

impl Registry {
    /// Returns false (and leaves the registry unchanged) on a duplicate id.
    pub fn insert(&mut self, employee: Employee) -> bool {
        if self.index.contains_key(&employee.id) {
            return false;
        }
        self.index.insert(employee.id.clone(), self.items.len());
        self.items.push(employee);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Employee> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Employee> {
        let i = *self.index.get(id)?;
        self.items.get_mut(i)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OrgState {
    pub clock:        SimClock,
    pub employees:    Registry,
    pub placeholders: Registry,
    pub vacancies:    Vec<Vacancy>,
    pub event_log:    Vec<Event>,
    id_counter:         u64,
    department_counter: u64,
    team_counter:       u64,
}

impl OrgState {
    pub fn new(start_date: SimDate) -> Self {
        Self {
            clock:        SimClock::new(start_date),
            employees:    Registry::default(),
            placeholders: Registry::default(),
            vacancies:    Vec::new(),
            event_log:    Vec::new(),
            id_counter:         0,
            department_counter: 0,
            team_counter:       0,
        }
    }

    pub fn today(&self) -> SimDate {
        self.clock.today
    }

    /// Next id for the given prefix. Employees and placeholders share one
    /// sequence, so ids stay unique across both registries.
    pub fn next_id(&mut self, prefix: &str) -> EmployeeId {
        self.id_counter += 1;
        format!("{prefix}{:03}", self.id_counter)
    }

    pub fn next_department(&mut self) -> String {
        self.department_counter += 1;
        format!("{DEPARTMENT_PREFIX}{}", self.department_counter)
    }

    pub fn next_team(&mut self) -> String {
        self.team_counter += 1;
        format!("{TEAM_PREFIX}{}", self.team_counter)
    }

    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    /// Restore sequence counters after an import so new ids and names
    /// continue past everything already present.
    pub(crate) fn restore_counters(&mut self, ids: u64, departments: u64, teams: u64) {
        self.id_counter = ids;
        self.department_counter = departments;
        self.team_counter = teams;
    }

    pub fn active_employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|e| e.active)
    }

    pub fn active_count(&self) -> usize {
        self.active_employees().count()
    }

    pub fn active_count_by_role(&self, role: Role) -> usize {
        self.active_employees().filter(|e| e.role == role).count()
    }

    pub fn count_by_role(&self) -> BTreeMap<Role, usize> {
        let mut counts = BTreeMap::new();
        for e in self.active_employees() {
            *counts.entry(e.role).or_insert(0) += 1;
        }
        counts
    }

    /// Look up a real employee first, then a placeholder.
    pub fn find(&self, id: &str) -> Option<&Employee> {
        self.employees.get(id).or_else(|| self.placeholders.get(id))
    }

    /// Active employees whose manager is `manager_id`, in registry order.
    pub fn direct_reports(&self, manager_id: &str) -> Vec<EmployeeId> {
        self.active_employees()
            .filter(|e| e.manager_id.as_deref() == Some(manager_id))
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn open_vacancies_for(&self, role: Role) -> usize {
        self.vacancies.iter().filter(|v| v.role == role).count()
    }

    /// A placeholder is available while an open vacancy still relies on it.
    pub fn is_placeholder_available(&self, placeholder_id: &str) -> bool {
        self.vacancies
            .iter()
            .any(|v| v.interim_manager_id.as_deref() == Some(placeholder_id))
    }
}
