//! Daily scheduler: event budget, per-type caps, the vacancy share of the
//! budget and the Monday fallback hire.

use chrono::Datelike;
use orgsim_core::{
    hiring_subsystem::HireRequest, EventType, Role, SimConfig, SimDate, SimEngine,
};

/// 2024-01-01 is a Monday.
fn start() -> SimDate {
    SimDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn is_monday(date: SimDate) -> bool {
    date.weekday() == chrono::Weekday::Mon
}

/// CEO → VP → Director → Manager, so fallback hires have a team to join.
fn with_one_team(config: SimConfig) -> SimEngine {
    let mut engine = SimEngine::new(start(), config).unwrap();
    let ceo = engine.state().employees.iter().next().unwrap().id.clone();
    let vp = engine
        .hire(HireRequest::new(Role::Vp, start()).reporting_to(ceo))
        .unwrap();
    let director = engine
        .hire(HireRequest::new(Role::Director, start()).reporting_to(vp))
        .unwrap();
    engine
        .hire(HireRequest::new(Role::Manager, start()).reporting_to(director))
        .unwrap();
    engine
}

#[test]
fn quiet_weeks_get_exactly_one_fallback_hire_on_monday() {
    let config = SimConfig { mean_events_per_day: 0.0, ..SimConfig::default() };
    let mut engine = with_one_team(config);
    let headcount = engine.state().active_count();

    for _ in 0..28 {
        let date = engine.today();
        let summary = engine.simulate_one_day();
        assert_eq!(summary.budget, 0, "{date}: a zero mean draws no events");
        assert_eq!(summary.vacancies_filled, 0, "{date}: no budget, no fills");
        assert!(summary.dispatched.is_empty());
        let expected = u32::from(is_monday(date));
        assert_eq!(summary.fallback_hires, expected, "{date}: wrong fallback count");
    }

    assert_eq!(engine.week_counter(), 4);
    assert_eq!(
        engine.state().active_count(),
        headcount + 4,
        "each of the four Mondays adds one Analyst"
    );
    let analysts = engine.state().active_count_by_role(Role::Analyst);
    assert_eq!(analysts, 4);
}

#[test]
fn weekly_tally_restarts_every_monday() {
    // Budget pinned at 2, far below the weekly minimum: every Monday must
    // make up the full shortfall counted from that day alone.
    let config = SimConfig {
        mean_events_per_day: 50.0,
        max_events_per_day: 2,
        min_events_per_week: 20,
        ..SimConfig::default().with_seed(31)
    };
    let mut engine = with_one_team(config);

    for _ in 0..35 {
        let date = engine.today();
        let summary = engine.simulate_one_day();
        let dispatched: u32 = summary.dispatched.values().sum();
        if is_monday(date) {
            assert_eq!(summary.fallback_hires, 20 - dispatched, "{date}: tally not reset");
        } else {
            assert_eq!(summary.fallback_hires, 0, "{date}: fallback outside Monday");
        }
    }
    assert_eq!(engine.week_counter(), 5);
}

#[test]
fn busy_days_respect_the_daily_and_per_type_caps() {
    let config = SimConfig { mean_events_per_day: 50.0, ..SimConfig::default().with_seed(5) };
    let mut engine = SimEngine::new(start(), config).unwrap();
    let max_per_day = engine.config().max_events_per_day;
    let mut saw_full_budget = false;

    for _ in 0..365 {
        let date = engine.today();
        let summary = engine.simulate_one_day();
        assert!(summary.budget <= max_per_day, "{date}: budget {} over cap", summary.budget);
        saw_full_budget |= summary.budget == max_per_day;

        for kind in EventType::ALL {
            let n = summary.dispatched.get(&kind).copied().unwrap_or(0);
            let cap = engine.config().event_cap(kind);
            assert!(n <= cap, "{date}: {n} {kind} events over cap {cap}");
        }
        let dispatched: u32 = summary.dispatched.values().sum();
        assert!(
            dispatched as usize + summary.vacancies_filled <= summary.budget as usize,
            "{date}: fills and events overspent the budget"
        );
        assert!(summary.applied <= dispatched);
    }
    assert!(saw_full_budget, "a mean of 50 should hit the daily cap");
}

#[test]
fn vacancies_take_at_most_half_the_budget_past_the_leaving_threshold() {
    let config = SimConfig {
        min_employees_for_leaving: 10,
        mean_events_per_day: 4.0,
        ..SimConfig::default().with_seed(13)
    };
    let threshold = config.min_employees_for_leaving as usize;
    let mut engine = SimEngine::new(start(), config).unwrap();
    let mut days_past_threshold = 0;

    for _ in 0..365 {
        let date = engine.today();
        let headcount = engine.state().active_count();
        let summary = engine.simulate_one_day();
        let budget = summary.budget as usize;

        if headcount >= threshold {
            days_past_threshold += 1;
            assert!(
                summary.vacancies_filled <= budget.div_ceil(2),
                "{date}: filled {} of budget {budget} past the threshold",
                summary.vacancies_filled
            );
        } else {
            assert!(summary.vacancies_filled <= budget, "{date}: fills over budget");
        }
    }
    assert!(days_past_threshold > 0, "the run never reached the leaving threshold");
}
