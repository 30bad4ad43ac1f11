//! Manager reassignment subsystem.
//!
//! Validates and applies a change of reporting line. The reporting graph
//! must stay a forest: a reassignment that would put an employee inside
//! its own manager chain is rejected.

use crate::{
    config::SimConfig,
    state::{Employee, OrgState},
    subsystem::SimContext,
    types::{EmployeeId, Role, SimDate},
};
use std::collections::HashSet;

pub struct ReassignmentSubsystem;

impl ReassignmentSubsystem {
    /// Move `employee_id` under `new_manager_id`. Returns false without
    /// touching the state when any check fails.
    pub fn change_manager(
        ctx: &mut SimContext<'_>,
        employee_id: &str,
        new_manager_id: &str,
        date: SimDate,
    ) -> bool {
        let Some(employee) = ctx.state.employees.get(employee_id) else {
            return false;
        };
        let Some(manager) = ctx.state.find(new_manager_id) else {
            return false;
        };
        if !employee.active || !manager.can_hold_reports() {
            return false;
        }
        if !Self::is_valid_manager(ctx.config, employee.role, manager) {
            return false;
        }
        // A change to the same manager would log an event with no transition.
        if employee.manager_id.as_deref() == Some(new_manager_id) {
            return false;
        }
        if Self::creates_cycle(ctx.state, employee_id, new_manager_id) {
            log::debug!("reassign {employee_id} -> {new_manager_id} rejected: cycle");
            return false;
        }

        let Some(employee) = ctx.state.employees.get_mut(employee_id) else {
            return false;
        };
        let event = employee.change_manager(new_manager_id.to_string(), date);
        ctx.state.event_log.push(event);
        true
    }

    /// The manager's role must be allowed for the employee's role.
    /// A placeholder is accepted whatever its role: it marks a vacant slot,
    /// not a real reporting relationship.
    pub fn is_valid_manager(config: &SimConfig, employee_role: Role, manager: &Employee) -> bool {
        manager.is_placeholder() || config.is_allowed_manager(employee_role, manager.role)
    }

    /// Walk up from the candidate manager. A cycle exists if the employee
    /// shows up in that chain. The walk also stops on any revisited node,
    /// so a malformed chain cannot loop forever.
    pub fn creates_cycle(state: &OrgState, employee_id: &str, new_manager_id: &str) -> bool {
        let mut visited: HashSet<EmployeeId> = HashSet::new();
        let mut current = Some(new_manager_id.to_string());

        while let Some(id) = current {
            if id == employee_id {
                return true;
            }
            current = state.find(&id).and_then(|e| e.manager_id.clone());
            if !visited.insert(id) {
                break;
            }
        }
        false
    }

    /// Random Change event: move a random employee under another valid,
    /// active manager.
    pub fn simulate(ctx: &mut SimContext<'_>, date: SimDate) -> bool {
        let candidates: Vec<EmployeeId> = ctx
            .state
            .active_employees()
            .filter(|e| e.manager_id.is_some())
            .map(|e| e.id.clone())
            .collect();
        let Some(employee_id) = ctx.rng.choose(&candidates).cloned() else {
            return false;
        };
        let Some(employee) = ctx.state.employees.get(&employee_id) else {
            return false;
        };
        let role = employee.role;
        let current = employee.manager_id.clone();

        let managers: Vec<EmployeeId> = ctx
            .state
            .active_employees()
            .filter(|m| {
                m.id != employee_id
                    && Some(&m.id) != current.as_ref()
                    && ctx.config.is_allowed_manager(role, m.role)
                    && !Self::creates_cycle(ctx.state, &employee_id, &m.id)
            })
            .map(|m| m.id.clone())
            .collect();
        let Some(new_manager_id) = ctx.rng.choose(&managers).cloned() else {
            return false;
        };

        Self::change_manager(ctx, &employee_id, &new_manager_id, date)
    }
}
