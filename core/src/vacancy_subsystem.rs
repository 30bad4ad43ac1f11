//! Vacancy subsystem: open positions with a deadline.
//!
//! Vacancies come from managerial hires (subordinate slots) and from
//! departures (backfills). Each day the scheduler calls
//! resolve_vacancies() before any other event so backlog is cleared first.
//!
//! RULE: Expired vacancies are dropped silently. They are not retried and
//! not counted anywhere.
//! RULE: Vacancies are scanned in creation order. Vacancies opened while
//! filling others wait for the next pass.

use crate::{
    hiring_subsystem::{HireRequest, HiringSubsystem},
    promotion_subsystem::PromotionSubsystem,
    reassignment_subsystem::ReassignmentSubsystem,
    state::Vacancy,
    subsystem::SimContext,
    types::{EmployeeId, Role, SimDate},
};
use chrono::Duration;

#[derive(Debug, Clone)]
pub struct VacancyRequest {
    pub role:               Role,
    pub manager_id:         Option<EmployeeId>,
    pub department:         Option<String>,
    pub team:               Option<String>,
    pub report_ids:         Vec<EmployeeId>,
    pub interim_manager_id: Option<EmployeeId>,
    pub date:               SimDate,
}

pub struct VacancySubsystem;

impl VacancySubsystem {
    pub fn create_vacancy(ctx: &mut SimContext<'_>, req: VacancyRequest) {
        let deadline = req.date + Duration::days(i64::from(ctx.config.vacancy_fill_deadline_days));
        ctx.state.vacancies.push(Vacancy {
            role:               req.role,
            manager_id:         req.manager_id,
            department:         req.department,
            team:               req.team,
            report_ids:         req.report_ids,
            deadline,
            interim_manager_id: req.interim_manager_id,
        });
    }

    /// Try to fill open vacancies, at most `max_fill` of them (no limit when
    /// None). Returns how many were filled.
    pub fn resolve_vacancies(
        ctx: &mut SimContext<'_>,
        date: SimDate,
        max_fill: Option<usize>,
    ) -> usize {
        let pending = ctx.state.vacancies.len();
        let mut filled = 0usize;
        let mut expired = 0usize;
        let mut i = 0usize;

        for _ in 0..pending {
            if ctx.state.vacancies[i].is_expired(date) {
                ctx.state.vacancies.remove(i);
                expired += 1;
                continue;
            }
            if max_fill.is_some_and(|cap| filled >= cap) {
                i += 1;
                continue;
            }
            let vacancy = ctx.state.vacancies[i].clone();
            if Self::try_fill(ctx, &vacancy, date) {
                // Fills only ever append, so index i still points at this vacancy.
                ctx.state.vacancies.remove(i);
                filled += 1;
            } else {
                i += 1;
            }
        }

        if filled > 0 || expired > 0 {
            log::debug!(
                "date={date} vacancies: filled={filled} expired={expired} open={}",
                ctx.state.vacancies.len()
            );
        }
        filled
    }

    /// Fill one vacancy by promotion or hire, then move its reports to the
    /// new occupant. Reports that cannot be moved stay where they are.
    fn try_fill(ctx: &mut SimContext<'_>, vacancy: &Vacancy, date: SimDate) -> bool {
        let strategy = ctx.config.fill_strategy(vacancy.role);
        let weights = [u64::from(strategy.promote), u64::from(strategy.hire)];
        let promote_first = ctx.rng.weighted_index(&weights) == Some(0);

        let mut occupant = None;
        if promote_first {
            occupant = Self::fill_by_promotion(ctx, vacancy, date);
        }
        if occupant.is_none() {
            let req = HireRequest {
                role:       vacancy.role,
                manager_id: vacancy.manager_id.clone(),
                department: vacancy.department.clone(),
                team:       vacancy.team.clone(),
                date,
            };
            occupant = HiringSubsystem::hire(ctx, req);
        }
        let Some(occupant) = occupant else {
            return false;
        };

        for report_id in &vacancy.report_ids {
            ReassignmentSubsystem::change_manager(ctx, report_id, &occupant, date);
        }
        true
    }

    /// Promote from the role that normally feeds the vacant one, move the
    /// promotee under the vacancy's manager and open a backfill for the
    /// slot it left.
    fn fill_by_promotion(
        ctx: &mut SimContext<'_>,
        vacancy: &Vacancy,
        date: SimDate,
    ) -> Option<EmployeeId> {
        let from_role = ctx.config.promotion_source(vacancy.role)?;
        let (candidate, to_role) = PromotionSubsystem::select_candidate(ctx, from_role, date)?;
        if to_role != vacancy.role {
            return None;
        }

        let prior = ctx.state.employees.get(&candidate)?;
        let backfill = VacancyRequest {
            role:               from_role,
            manager_id:         prior.manager_id.clone(),
            department:         prior.department.clone(),
            team:               prior.team.clone(),
            report_ids:         ctx.state.direct_reports(&candidate),
            interim_manager_id: None,
            date,
        };

        if !PromotionSubsystem::promote(ctx, &candidate, to_role, date) {
            return None;
        }
        if let Some(manager_id) = &vacancy.manager_id {
            ReassignmentSubsystem::change_manager(ctx, &candidate, manager_id, date);
        }
        Self::create_vacancy(ctx, backfill);
        Some(candidate)
    }
}
