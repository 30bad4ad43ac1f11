//! Structural invariant checks over an OrgState.
//!
//! Non-panicking: every check returns the first violation found as
//! SimError::InvariantViolation. The engine runs check() after every day
//! in debug builds, tests call it directly.

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    state::{Employee, OrgState},
    types::{EventType, Role},
};
use std::collections::HashSet;

pub fn check(state: &OrgState, config: &SimConfig) -> SimResult<()> {
    check_acyclic(state)?;
    check_quotas(state, config)?;
    check_manager_refs(state)?;
    check_histories(state)?;
    check_event_log(state)?;
    check_placeholders(state)?;
    Ok(())
}

fn violation(message: String) -> SimError {
    SimError::InvariantViolation(message)
}

// ── Reporting graph ────────────────────────────────────────────

/// No employee (real or placeholder) may appear in its own manager chain.
fn check_acyclic(state: &OrgState) -> SimResult<()> {
    for employee in state.employees.iter().chain(state.placeholders.iter()) {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = employee.manager_id.as_deref();
        while let Some(id) = current {
            if id == employee.id {
                return Err(violation(format!("{} is its own ancestor", employee.id)));
            }
            if !visited.insert(id) {
                return Err(violation(format!(
                    "manager chain above {} loops at {id}",
                    employee.id
                )));
            }
            current = state.find(id).and_then(|m| m.manager_id.as_deref());
        }
    }
    Ok(())
}

fn check_manager_refs(state: &OrgState) -> SimResult<()> {
    for employee in state.active_employees().filter(|e| e.role != Role::Ceo) {
        if let Some(manager_id) = &employee.manager_id {
            let Some(manager) = state.find(manager_id) else {
                return Err(violation(format!(
                    "{} reports to unknown employee {manager_id}",
                    employee.id
                )));
            };
            // Departed Managers, Directors and VPs hand their reports to a
            // placeholder. Other departed roles keep theirs.
            if !manager.can_hold_reports()
                && matches!(manager.role, Role::Manager | Role::Director | Role::Vp)
            {
                return Err(violation(format!(
                    "{} reports to departed {} {manager_id}",
                    employee.id, manager.role
                )));
            }
        }
    }
    Ok(())
}

// ── Capacity ───────────────────────────────────────────────────

fn check_quotas(state: &OrgState, config: &SimConfig) -> SimResult<()> {
    for (role, count) in state.count_by_role() {
        let quota = config.quota(role) as usize;
        if count > quota {
            return Err(violation(format!("{count} active {role} exceeds quota {quota}")));
        }
    }
    let total = state.active_count();
    if total > config.max_employees as usize {
        return Err(violation(format!(
            "active headcount {total} exceeds max_employees {}",
            config.max_employees
        )));
    }
    Ok(())
}

// ── History and log ────────────────────────────────────────────

fn check_histories(state: &OrgState) -> SimResult<()> {
    for employee in state.employees.iter() {
        check_history(employee)?;
    }
    Ok(())
}

fn check_history(employee: &Employee) -> SimResult<()> {
    let Some(first) = employee.history.first() else {
        return Err(violation(format!("{} has an empty history", employee.id)));
    };
    if first.event_type != EventType::Employed {
        return Err(violation(format!(
            "{} history starts with {} instead of employed",
            employee.id, first.event_type
        )));
    }
    for pair in employee.history.windows(2) {
        if pair[1].date < pair[0].date {
            return Err(violation(format!(
                "{} history goes back in time at {}",
                employee.id, pair[1].date
            )));
        }
    }
    if employee.history.iter().any(|e| e.employee_id != employee.id) {
        return Err(violation(format!("{} history holds another employee's event", employee.id)));
    }
    Ok(())
}

/// The log is chronological, every entry names a real employee hired on or
/// before it, and it holds exactly the events recorded in the histories.
fn check_event_log(state: &OrgState) -> SimResult<()> {
    for pair in state.event_log.windows(2) {
        if pair[1].date < pair[0].date {
            return Err(violation(format!(
                "event log goes back in time at {} ({})",
                pair[1].date, pair[1].employee_id
            )));
        }
    }
    for event in &state.event_log {
        let Some(subject) = state.employees.get(&event.employee_id) else {
            return Err(violation(format!(
                "logged {} event for unknown employee {}",
                event.event_type, event.employee_id
            )));
        };
        if event.date < subject.hire_date {
            return Err(violation(format!(
                "{} has a {} event before its hire date",
                event.employee_id, event.event_type
            )));
        }
    }
    let recorded: usize = state.employees.iter().map(|e| e.history.len()).sum();
    if recorded != state.event_log.len() {
        return Err(violation(format!(
            "event log has {} entries but histories record {recorded}",
            state.event_log.len()
        )));
    }
    Ok(())
}

fn check_placeholders(state: &OrgState) -> SimResult<()> {
    for placeholder in state.placeholders.iter() {
        if placeholder.active || !placeholder.is_placeholder() {
            return Err(violation(format!("{} is not a valid placeholder", placeholder.id)));
        }
    }
    Ok(())
}
