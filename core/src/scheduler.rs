//! Daily scheduler: decides how many and which events happen each day.
//!
//! EXECUTION ORDER within one day (fixed, never reordered):
//!   1. Draw the day's event budget (Poisson, capped at max_events_per_day)
//!   2. Resolve open vacancies
//!   3. Spend the remaining budget on sampled event types
//!   4. Weekly fallback hire (Mondays only)
//!
//! RULE: Events are applied one at a time, in sampled order. Each one sees
//! every mutation made before it on the same day.
//! RULE: A rejected action still consumes its slot in the budget and
//! counts towards the day's and the week's tallies.

use crate::{
    clock::SimClock,
    departure_subsystem::DepartureSubsystem,
    hiring_subsystem::HiringSubsystem,
    promotion_subsystem::PromotionSubsystem,
    reassignment_subsystem::ReassignmentSubsystem,
    subsystem::SimContext,
    types::{EventType, SimDate},
    vacancy_subsystem::VacancySubsystem,
};
use std::collections::BTreeMap;

/// What happened on one simulated day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub budget:           u32,
    pub vacancies_filled: usize,
    /// Sampled event types, whether or not the action was applied.
    pub dispatched:       BTreeMap<EventType, u32>,
    /// Sampled actions that changed the state.
    pub applied:          u32,
    pub fallback_hires:   u32,
}

#[derive(Debug, Clone, Default)]
pub struct DailyScheduler {
    week_counter: u32,
    weekly_tally: BTreeMap<EventType, u32>,
}

impl DailyScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn week_counter(&self) -> u32 {
        self.week_counter
    }

    pub fn weekly_total(&self) -> u32 {
        self.weekly_tally.values().sum()
    }

    pub fn run_day(&mut self, ctx: &mut SimContext<'_>, date: SimDate) -> DaySummary {
        let week_start = SimClock::is_week_start(date);
        if week_start {
            self.week_counter += 1;
            self.weekly_tally.clear();
        }

        let mut summary = DaySummary {
            budget: ctx
                .rng
                .poisson(ctx.config.mean_events_per_day)
                .min(ctx.config.max_events_per_day),
            ..DaySummary::default()
        };

        // Below the leaving threshold the whole budget goes to building
        // structure; after that vacancies get about half of it.
        let budget = summary.budget as usize;
        let max_fill = if ctx.state.active_count() < ctx.config.min_employees_for_leaving as usize {
            budget
        } else {
            budget.div_ceil(2)
        };
        summary.vacancies_filled = VacancySubsystem::resolve_vacancies(ctx, date, Some(max_fill));

        let remaining = budget.saturating_sub(summary.vacancies_filled);
        for _ in 0..remaining {
            let Some(kind) = Self::sample_event_type(ctx, &summary.dispatched) else {
                break;
            };
            if Self::execute(ctx, kind, date) {
                summary.applied += 1;
            }
            *summary.dispatched.entry(kind).or_insert(0) += 1;
            *self.weekly_tally.entry(kind).or_insert(0) += 1;
        }

        if week_start {
            let shortfall = ctx.config.min_events_per_week.saturating_sub(self.weekly_total());
            for _ in 0..shortfall {
                HiringSubsystem::simulate(ctx, date);
                summary.fallback_hires += 1;
            }
            if shortfall > 0 {
                log::debug!("date={date} week={} quiet, forced {shortfall} fallback hire(s)", self.week_counter);
            }
        }

        log::debug!(
            "date={date} budget={} filled={} dispatched={} applied={}",
            summary.budget,
            summary.vacancies_filled,
            summary.dispatched.values().sum::<u32>(),
            summary.applied
        );
        summary
    }

    /// Weighted pick among event types still under today's cap.
    /// None once every type with a nonzero weight is capped.
    fn sample_event_type(
        ctx: &mut SimContext<'_>,
        today: &BTreeMap<EventType, u32>,
    ) -> Option<EventType> {
        let (kinds, weights): (Vec<EventType>, Vec<u64>) = EventType::ALL
            .into_iter()
            .filter(|kind| today.get(kind).copied().unwrap_or(0) < ctx.config.event_cap(*kind))
            .map(|kind| (kind, u64::from(ctx.config.event_weight(kind))))
            .unzip();
        let index = ctx.rng.weighted_index(&weights)?;
        Some(kinds[index])
    }

    fn execute(ctx: &mut SimContext<'_>, kind: EventType, date: SimDate) -> bool {
        match kind {
            EventType::Employed => HiringSubsystem::simulate(ctx, date),
            EventType::Promoted => PromotionSubsystem::simulate(ctx, date),
            EventType::Left     => DepartureSubsystem::simulate(ctx, date),
            EventType::Change   => ReassignmentSubsystem::simulate(ctx, date),
        }
    }
}
