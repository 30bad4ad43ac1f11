//! sim-runner: headless runner and batch driver for the org simulator.
//!
//! Usage:
//!   sim-runner --seed 42 --days 365
//!   sim-runner --seed 42 --days 365 --start 2024-01-01 --config cfg.json
//!   sim-runner --seed 42 --days 365 --out export.json --db runs.db
//!   sim-runner --days 365 --sweep 100 > stats.jsonl
//!
//! A sweep runs seeds 0..K and prints one JSON line per run: the
//! statistics together with the parameters that produced them.

use anyhow::{Context, Result};
use orgsim_core::{
    engine::SimEngine,
    statistics::SimStatistics,
    store::SimStore,
    types::iso_date,
    SimConfig, SimDate,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;

#[derive(Serialize)]
struct SweepRecord<'a> {
    run_id:     String,
    seed:       u64,
    days:       u32,
    #[serde(with = "iso_date")]
    start_date: SimDate,
    params:     &'a SimConfig,
    statistics: BTreeMap<String, f64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let days = parse_arg(&args, "--days", 365u32);
    let sweep = parse_arg(&args, "--sweep", 0u64);
    let start = match flag_value(&args, "--start") {
        Some(raw) => iso_date::parse(raw).map_err(anyhow::Error::msg)?,
        None => SimDate::from_ymd_opt(2024, 1, 1).context("default start date")?,
    };
    let config = match flag_value(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let seed = parse_arg(&args, "--seed", config.random_seed);
    let store = match flag_value(&args, "--db") {
        Some(path) => {
            let store = SimStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };

    if sweep > 0 {
        return run_sweep(&config, start, days, sweep, store.as_ref());
    }

    let config = config.with_seed(seed);
    println!("Org simulator: sim-runner");
    println!("  seed:      {seed}");
    println!("  days:      {days}");
    println!("  start:     {start}");
    println!("  wall:      {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    let mut engine = SimEngine::new(start, config)?;
    engine.simulate_for_days(days);
    let stats = engine.compute_statistics();

    if let Some(path) = flag_value(&args, "--out") {
        engine.save_to_json(path)?;
        println!("  export:    {path}");
    }
    if let Some(store) = &store {
        let run_id = persist(store, &engine, &stats)?;
        println!("  run_id:    {run_id}");
    }
    print_summary(&engine, &stats);
    Ok(())
}

/// Independent runs over seeds 0..count, one JSON line each.
fn run_sweep(
    base: &SimConfig,
    start: SimDate,
    days: u32,
    count: u64,
    store: Option<&SimStore>,
) -> Result<()> {
    for seed in 0..count {
        let config = base.clone().with_seed(seed);
        let mut engine = SimEngine::new(start, config)?;
        engine.simulate_for_days(days);
        let stats = engine.compute_statistics();

        let run_id = match store {
            Some(store) => persist(store, &engine, &stats)?,
            None => new_run_id(),
        };
        let record = SweepRecord {
            run_id,
            seed,
            days,
            start_date: start,
            params: engine.config(),
            statistics: stats.to_map(),
        };
        println!("{}", serde_json::to_string(&record)?);
        log::info!("sweep {}/{count} done", seed + 1);
    }
    Ok(())
}

fn persist(store: &SimStore, engine: &SimEngine, stats: &SimStatistics) -> Result<String> {
    let run_id = new_run_id();
    store.insert_run(&run_id, env!("CARGO_PKG_VERSION"), engine.config())?;
    store.save_export(&run_id, &engine.export())?;
    store.save_statistics(&run_id, stats)?;
    Ok(run_id)
}

fn new_run_id() -> String {
    format!("run-{}", uuid::Uuid::new_v4())
}

fn print_summary(engine: &SimEngine, stats: &SimStatistics) {
    let state = engine.state();
    println!("=== RUN SUMMARY ===");
    println!("  final date:       {}", engine.today());
    println!("  headcount:        {}", state.active_count());
    println!("  placeholders:     {}", state.placeholders.len());
    println!("  open vacancies:   {}", state.vacancies.len());
    println!("  events logged:    {}", state.event_log.len());
    for (role, count) in state.count_by_role() {
        println!("    {:<16}{count:>4} / {}", role.label(), engine.config().quota(role));
    }
    println!();
    println!("=== STATISTICS ===");
    for (name, value) in stats.to_map() {
        println!("  {name:<30}{value}");
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
