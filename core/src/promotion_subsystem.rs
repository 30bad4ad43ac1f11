//! Promotion subsystem: moves one employee a level up.
//!
//! Candidates are sampled with weight (tenure in days + 1): the longer
//! someone has been hired, the likelier the promotion.
//!
//! RULE: Promotion never opens a vacancy for the slot it leaves behind.
//! The vacancy fill path (vacancy_subsystem.rs) does that when it
//! promotes into a vacancy.

use crate::{
    reassignment_subsystem::ReassignmentSubsystem,
    state::Employee,
    subsystem::SimContext,
    types::{EmployeeId, Role, SimDate},
};

/// Order in which a random Promoted event tries each source role.
const PROMOTION_SWEEP: [Role; 5] = [
    Role::Analyst,
    Role::SeniorAnalyst,
    Role::Manager,
    Role::Director,
    Role::Vp,
];

pub struct PromotionSubsystem;

impl PromotionSubsystem {
    /// Eligibility hook. Every active employee qualifies for now.
    pub fn can_be_promoted(_employee: &Employee) -> bool {
        true
    }

    /// Pick a tenure-weighted candidate from `from_role` without changing
    /// anything. None if there is no next role, the next role is at quota,
    /// or nobody qualifies.
    pub fn select_candidate(
        ctx: &mut SimContext<'_>,
        from_role: Role,
        date: SimDate,
    ) -> Option<(EmployeeId, Role)> {
        let to_role = *ctx.config.promotion_order.get(&from_role)?;
        if ctx.state.active_count_by_role(to_role) >= ctx.config.quota(to_role) as usize {
            return None;
        }

        let (ids, weights): (Vec<EmployeeId>, Vec<u64>) = ctx
            .state
            .active_employees()
            .filter(|e| e.role == from_role && Self::can_be_promoted(e))
            .map(|e| (e.id.clone(), e.tenure_weight(date)))
            .unzip();

        let index = ctx.rng.weighted_index(&weights)?;
        Some((ids[index].clone(), to_role))
    }

    /// Promote `employee_id` to `to_role`, then settle its reporting line
    /// for the new role.
    pub fn promote(
        ctx: &mut SimContext<'_>,
        employee_id: &str,
        to_role: Role,
        date: SimDate,
    ) -> bool {
        let Some(employee) = ctx.state.employees.get_mut(employee_id) else {
            return false;
        };
        if !employee.active {
            return false;
        }
        let from_role = employee.role;
        let event = employee.promote(to_role, date);
        ctx.state.event_log.push(event);
        log::debug!("date={date} promoted {employee_id} {from_role} -> {to_role}");

        Self::realign_manager(ctx, employee_id, to_role, date);
        true
    }

    pub fn promote_random(
        ctx: &mut SimContext<'_>,
        from_role: Role,
        date: SimDate,
    ) -> Option<EmployeeId> {
        let (id, to_role) = Self::select_candidate(ctx, from_role, date)?;
        Self::promote(ctx, &id, to_role, date).then_some(id)
    }

    /// Keep the current manager if it is still valid for the new role.
    /// Otherwise take the first active employee with an allowed role, or
    /// failing that the first placeholder still covering a vacancy.
    fn realign_manager(ctx: &mut SimContext<'_>, employee_id: &str, role: Role, date: SimDate) {
        let state = &*ctx.state;
        let current = state
            .employees
            .get(employee_id)
            .and_then(|e| e.manager_id.as_deref())
            .and_then(|id| state.find(id));
        if current.is_some_and(|m| {
            m.can_hold_reports() && ReassignmentSubsystem::is_valid_manager(ctx.config, role, m)
        }) {
            return;
        }

        let target = state
            .active_employees()
            .find(|m| m.id != employee_id && ctx.config.is_allowed_manager(role, m.role))
            .or_else(|| {
                state.placeholders.iter().find(|p| {
                    ctx.config.is_allowed_manager(role, p.role)
                        && state.is_placeholder_available(&p.id)
                })
            })
            .map(|m| m.id.clone());

        if let Some(manager_id) = target {
            ReassignmentSubsystem::change_manager(ctx, employee_id, &manager_id, date);
        }
    }

    /// Random Promoted event: sweep source roles bottom-up and stop at the
    /// first successful promotion.
    pub fn simulate(ctx: &mut SimContext<'_>, date: SimDate) -> bool {
        PROMOTION_SWEEP
            .into_iter()
            .any(|from_role| Self::promote_random(ctx, from_role, date).is_some())
    }
}
