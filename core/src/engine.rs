//! The simulation engine: owns one organisation and runs it day by day.
//!
//! EXECUTION ORDER per simulated day (fixed, never reordered):
//!   1. Vacancy resolution        (vacancy_subsystem.rs)
//!   2. Sampled events            (hiring / promotion / departure / reassignment)
//!   3. Weekly fallback hire      (Mondays only)
//!   4. Clock advances one day
//!
//! RULES:
//!   - One engine, one OrgState, one SimRng. Nothing is shared between engines.
//!   - All randomness flows through the engine's SimRng.
//!   - All state changes are recorded in the event log.
//!   - Callers outside the crate go through this type, never through the
//!     rule subsystems directly.

use crate::{
    config::SimConfig,
    departure_subsystem::DepartureSubsystem,
    error::SimResult,
    hiring_subsystem::{HireRequest, HiringSubsystem},
    invariants,
    org_chart::{self, OrgChartNode},
    promotion_subsystem::PromotionSubsystem,
    reassignment_subsystem::ReassignmentSubsystem,
    rng::SimRng,
    scheduler::{DailyScheduler, DaySummary},
    snapshot::SimExport,
    state::OrgState,
    statistics::{self, DailyActivity, SimStatistics},
    subsystem::SimContext,
    types::{EmployeeId, Role, SimDate},
    vacancy_subsystem::{VacancyRequest, VacancySubsystem},
};

pub struct SimEngine {
    config:    SimConfig,
    state:     OrgState,
    rng:       SimRng,
    scheduler: DailyScheduler,
}

impl SimEngine {
    /// Validate the config, then hire the CEO on `start_date`. The CEO hire
    /// opens the first VP vacancies, so the organisation grows top-down.
    pub fn new(start_date: SimDate, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut engine = Self::assemble(config, OrgState::new(start_date));
        match engine.hire(HireRequest::new(Role::Ceo, start_date)) {
            Some(ceo) => log::info!(
                "Engine started {start_date} seed={} ceo={ceo}",
                engine.config.random_seed
            ),
            None => log::warn!("Engine started {start_date} without a CEO"),
        }
        Ok(engine)
    }

    fn assemble(config: SimConfig, state: OrgState) -> Self {
        Self {
            rng: SimRng::new(config.random_seed),
            scheduler: DailyScheduler::new(),
            config,
            state,
        }
    }

    fn ctx(&mut self) -> SimContext<'_> {
        SimContext::new(&mut self.state, &self.config, &mut self.rng)
    }

    // ── Running ────────────────────────────────────────────────

    /// Run today, then advance the clock.
    pub fn simulate_one_day(&mut self) -> DaySummary {
        let date = self.state.today();
        let mut ctx = SimContext::new(&mut self.state, &self.config, &mut self.rng);
        let summary = self.scheduler.run_day(&mut ctx, date);
        self.state.clock.advance();

        if cfg!(debug_assertions) {
            if let Err(e) = invariants::check(&self.state, &self.config) {
                log::error!("date={date} {e}");
            }
        }
        summary
    }

    /// Advance `days` calendar days. Calling it again continues from the
    /// current date.
    pub fn simulate_for_days(&mut self, days: u32) {
        for _ in 0..days {
            self.simulate_one_day();
        }
        log::info!(
            "Simulated {days} days, now {} headcount={} events={} open vacancies={}",
            self.state.today(),
            self.state.active_count(),
            self.state.event_log.len(),
            self.state.vacancies.len()
        );
    }

    // ── Rule operations ────────────────────────────────────────

    pub fn hire(&mut self, req: HireRequest) -> Option<EmployeeId> {
        HiringSubsystem::hire(&mut self.ctx(), req)
    }

    pub fn promote_random(&mut self, from_role: Role, date: SimDate) -> Option<EmployeeId> {
        PromotionSubsystem::promote_random(&mut self.ctx(), from_role, date)
    }

    pub fn mark_left(&mut self, employee_id: &str, date: SimDate) {
        DepartureSubsystem::mark_left(&mut self.ctx(), employee_id, date);
    }

    pub fn change_manager(&mut self, employee_id: &str, new_manager_id: &str, date: SimDate) -> bool {
        ReassignmentSubsystem::change_manager(&mut self.ctx(), employee_id, new_manager_id, date)
    }

    pub fn create_vacancy(&mut self, req: VacancyRequest) {
        VacancySubsystem::create_vacancy(&mut self.ctx(), req);
    }

    pub fn resolve_vacancies(&mut self, date: SimDate, max_fill: Option<usize>) -> usize {
        VacancySubsystem::resolve_vacancies(&mut self.ctx(), date, max_fill)
    }

    // ── Read side ──────────────────────────────────────────────

    pub fn state(&self) -> &OrgState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn today(&self) -> SimDate {
        self.state.today()
    }

    pub fn week_counter(&self) -> u32 {
        self.scheduler.week_counter()
    }

    pub fn compute_statistics(&self) -> SimStatistics {
        SimStatistics::compute(&self.state, &self.config)
    }

    pub fn daily_activity(&self) -> Vec<DailyActivity> {
        statistics::daily_activity(&self.state)
    }

    pub fn org_chart_at(&self, date: SimDate) -> Vec<OrgChartNode> {
        org_chart::org_chart_at(&self.state, date)
    }

    pub fn check_invariants(&self) -> SimResult<()> {
        invariants::check(&self.state, &self.config)
    }

    // ── Export / import ────────────────────────────────────────

    pub fn export(&self) -> SimExport {
        SimExport::capture(&self.state)
    }

    /// Rebuild an engine from an export. The RNG is reseeded from `config`
    /// and the scheduler starts a fresh week.
    pub fn load(export: SimExport, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let state = export.into_state()?;
        log::info!(
            "Loaded run at {}: {} employees, {} events",
            state.today(),
            state.employees.len(),
            state.event_log.len()
        );
        Ok(Self::assemble(config, state))
    }

    pub fn to_json(&self) -> SimResult<String> {
        self.export().to_json()
    }

    pub fn from_json(json: &str, config: SimConfig) -> SimResult<Self> {
        Self::load(SimExport::from_json(json)?, config)
    }

    pub fn save_to_json(&self, path: &str) -> SimResult<()> {
        std::fs::write(path, self.to_json()?)?;
        log::debug!("Export written to {path}");
        Ok(())
    }

    pub fn load_from_json(path: &str, config: SimConfig) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, config)
    }
}
