//! Departure subsystem: employees leaving the organisation.
//!
//! When a Manager, Director or VP leaves with direct reports, a
//! placeholder ("TEMP") manager takes over every active report, whatever
//! its role, until the backfill vacancy is resolved. Reassignment to a
//! placeholder only checks for cycles, so no active report is left pointing
//! at a departed manager of those roles.

use crate::{
    reassignment_subsystem::ReassignmentSubsystem,
    state::{Employee, PLACEHOLDER_ID_PREFIX},
    subsystem::SimContext,
    types::{EmployeeId, Role, SimDate},
    vacancy_subsystem::{VacancyRequest, VacancySubsystem},
};

pub struct DepartureSubsystem;

impl DepartureSubsystem {
    /// Deactivate an employee and open the backfill vacancy.
    /// No-op for unknown or already inactive employees.
    pub fn mark_left(ctx: &mut SimContext<'_>, employee_id: &str, date: SimDate) {
        let Some(employee) = ctx.state.employees.get_mut(employee_id) else {
            return;
        };
        if !employee.active {
            return;
        }
        let event = employee.leave(date);
        let role = employee.role;
        let manager_id = employee.manager_id.clone();
        let department = employee.department.clone();
        let team = employee.team.clone();
        ctx.state.event_log.push(event);

        let report_ids = ctx.state.direct_reports(employee_id);
        let needs_placeholder =
            matches!(role, Role::Manager | Role::Director | Role::Vp) && !report_ids.is_empty();

        let interim_manager_id = if needs_placeholder {
            let placeholder_id = Self::create_placeholder(
                ctx,
                role,
                manager_id.clone(),
                department.clone(),
                team.clone(),
                date,
            );
            for report_id in &report_ids {
                ReassignmentSubsystem::change_manager(ctx, report_id, &placeholder_id, date);
            }
            Some(placeholder_id)
        } else {
            None
        };

        log::debug!(
            "date={date} {employee_id} ({role}) left, {} reports, placeholder={:?}",
            report_ids.len(),
            interim_manager_id
        );

        VacancySubsystem::create_vacancy(
            ctx,
            VacancyRequest {
                role,
                manager_id,
                department,
                team,
                report_ids,
                interim_manager_id,
                date,
            },
        );
    }

    /// Placeholders are never active and never enter the event log.
    fn create_placeholder(
        ctx: &mut SimContext<'_>,
        role: Role,
        manager_id: Option<EmployeeId>,
        department: Option<String>,
        team: Option<String>,
        date: SimDate,
    ) -> EmployeeId {
        let id = ctx.state.next_id(PLACEHOLDER_ID_PREFIX);
        let mut placeholder = Employee::create(id.clone(), role, date, manager_id, department, team);
        placeholder.active = false;
        ctx.state.placeholders.insert(placeholder);
        id
    }

    /// Random Left event. Departures start once headcount reaches
    /// min_employees_for_leaving; the CEO and VPs never leave at random.
    pub fn simulate(ctx: &mut SimContext<'_>, date: SimDate) -> bool {
        if ctx.state.active_count() < ctx.config.min_employees_for_leaving as usize {
            return false;
        }
        let leavers: Vec<EmployeeId> = ctx
            .state
            .active_employees()
            .filter(|e| !matches!(e.role, Role::Ceo | Role::Vp))
            .map(|e| e.id.clone())
            .collect();
        let Some(employee_id) = ctx.rng.choose(&leavers).cloned() else {
            return false;
        };
        Self::mark_left(ctx, &employee_id, date);
        true
    }
}
