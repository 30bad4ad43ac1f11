//! Hiring subsystem: external hires under quota.
//!
//! A managerial hire opens vacancies for its direct-subordinate role, so
//! the organisation grows top-down: the CEO opens VP slots, each VP opens
//! Director slots, and so on.

use crate::{
    state::{Employee, EMPLOYEE_ID_PREFIX},
    subsystem::SimContext,
    types::{EmployeeId, Role, SimDate},
    vacancy_subsystem::{VacancyRequest, VacancySubsystem},
};

#[derive(Debug, Clone)]
pub struct HireRequest {
    pub role:       Role,
    pub manager_id: Option<EmployeeId>,
    pub department: Option<String>,
    pub team:       Option<String>,
    pub date:       SimDate,
}

impl HireRequest {
    pub fn new(role: Role, date: SimDate) -> Self {
        Self { role, manager_id: None, department: None, team: None, date }
    }

    pub fn reporting_to(mut self, manager_id: impl Into<EmployeeId>) -> Self {
        self.manager_id = Some(manager_id.into());
        self
    }

    pub fn in_unit(mut self, department: Option<String>, team: Option<String>) -> Self {
        self.department = department;
        self.team = team;
        self
    }
}

pub struct HiringSubsystem;

impl HiringSubsystem {
    /// Hire one employee. None when headcount, role quota or the manager
    /// check rejects the hire; nothing is changed in that case.
    pub fn hire(ctx: &mut SimContext<'_>, req: HireRequest) -> Option<EmployeeId> {
        let state = &*ctx.state;
        if state.active_count() >= ctx.config.max_employees as usize {
            log::debug!("hire {} rejected: headcount at max", req.role);
            return None;
        }
        if state.active_count_by_role(req.role) >= ctx.config.quota(req.role) as usize {
            log::debug!("hire {} rejected: role quota reached", req.role);
            return None;
        }
        if let Some(manager_id) = &req.manager_id {
            if !state.employees.get(manager_id).is_some_and(|m| m.active) {
                log::debug!("hire {} rejected: manager {manager_id} not active", req.role);
                return None;
            }
        }

        let (department, team) = if req.role.carries_structure() {
            (req.department, req.team)
        } else {
            (None, None)
        };

        let id = ctx.state.next_id(EMPLOYEE_ID_PREFIX);
        let employee = Employee::create(
            id.clone(),
            req.role,
            req.date,
            req.manager_id,
            department.clone(),
            team.clone(),
        );
        ctx.state.event_log.extend(employee.history.iter().cloned());
        ctx.state.employees.insert(employee);
        log::debug!("date={} hired {id} as {}", req.date, req.role);

        if req.role.is_managerial() {
            Self::open_subordinate_vacancies(ctx, &id, req.role, department, team, req.date);
        }
        Some(id)
    }

    fn subordinate_role(ctx: &mut SimContext<'_>, role: Role) -> Option<Role> {
        match role {
            Role::Ceo      => Some(Role::Vp),
            Role::Vp       => Some(Role::Director),
            Role::Director => Some(Role::Manager),
            Role::Manager  => Some(if ctx.rng.chance(0.5) {
                Role::SeniorAnalyst
            } else {
                Role::Analyst
            }),
            Role::SeniorAnalyst | Role::Analyst => None,
        }
    }

    /// Open one vacancy per slot in the new manager's span of control:
    /// the subordinate quota spread evenly over the manager's own quota,
    /// never beyond what the subordinate quota still has room for.
    fn open_subordinate_vacancies(
        ctx: &mut SimContext<'_>,
        manager_id: &str,
        role: Role,
        department: Option<String>,
        team: Option<String>,
        date: SimDate,
    ) {
        let Some(sub_role) = Self::subordinate_role(ctx, role) else {
            return;
        };
        let sub_quota = ctx.config.quota(sub_role);
        let span = sub_quota.div_ceil(ctx.config.quota(role).max(1));
        let committed =
            ctx.state.active_count_by_role(sub_role) + ctx.state.open_vacancies_for(sub_role);
        let headroom = (sub_quota as usize).saturating_sub(committed);
        let slots = (span as usize).min(headroom);

        for _ in 0..slots {
            let (department, team) = match sub_role {
                Role::Ceo | Role::Vp => (None, None),
                Role::Director => (Some(ctx.state.next_department()), None),
                Role::Manager => (department.clone(), Some(ctx.state.next_team())),
                Role::SeniorAnalyst | Role::Analyst => (department.clone(), team.clone()),
            };
            VacancySubsystem::create_vacancy(
                ctx,
                VacancyRequest {
                    role: sub_role,
                    manager_id: Some(manager_id.to_string()),
                    department,
                    team,
                    report_ids: Vec::new(),
                    interim_manager_id: None,
                    date,
                },
            );
        }
        if slots > 0 {
            log::debug!("{manager_id} opened {slots} {sub_role} vacancies");
        }
    }

    /// Random Employed event: an Analyst joins a random Manager's team.
    /// Without Managers, any active employee allowed to manage Analysts
    /// may take the hire.
    pub fn simulate(ctx: &mut SimContext<'_>, date: SimDate) -> bool {
        let mut managers: Vec<&Employee> = ctx
            .state
            .active_employees()
            .filter(|e| e.role == Role::Manager)
            .collect();
        if managers.is_empty() {
            managers = ctx
                .state
                .active_employees()
                .filter(|e| ctx.config.is_allowed_manager(Role::Analyst, e.role))
                .collect();
        }
        let Some(manager) = ctx.rng.choose(&managers) else {
            return false;
        };
        let req = HireRequest::new(Role::Analyst, date)
            .reporting_to(manager.id.clone())
            .in_unit(manager.department.clone(), manager.team.clone());

        Self::hire(ctx, req).is_some()
    }
}
