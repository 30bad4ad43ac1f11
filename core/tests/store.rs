//! SQLite export of finished runs.

use orgsim_core::{
    hiring_subsystem::HireRequest, store::SimStore, EventType, Role, SimConfig, SimDate,
    SimEngine,
};

fn start() -> SimDate {
    SimDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn store() -> SimStore {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn persist(store: &SimStore, run_id: &str, engine: &SimEngine) {
    store.insert_run(run_id, "test", engine.config()).unwrap();
    store.save_export(run_id, &engine.export()).unwrap();
    store.save_statistics(run_id, &engine.compute_statistics()).unwrap();
}

#[test]
fn saved_run_matches_the_engine() {
    let mut engine = SimEngine::new(start(), SimConfig::default().with_seed(17)).unwrap();
    engine.simulate_for_days(180);
    let store = store();
    persist(&store, "run-a", &engine);

    assert_eq!(store.employee_count("run-a").unwrap(), engine.state().employees.len() as u64);
    assert_eq!(store.event_count("run-a").unwrap(), engine.state().event_log.len() as u64);

    let stats = engine.compute_statistics();
    assert_eq!(
        store.statistic("run-a", "total_num_hired").unwrap(),
        Some(stats.total_num_hired as f64)
    );
    assert_eq!(
        store.statistic("run-a", "org_saturation_day").unwrap(),
        Some(stats.org_saturation_day as f64)
    );
    assert_eq!(store.statistic("run-a", "no_such_statistic").unwrap(), None);
}

#[test]
fn employee_history_reads_back_in_log_order() {
    let mut engine = SimEngine::new(start(), SimConfig::default().with_seed(2)).unwrap();
    engine.simulate_for_days(120);
    let store = store();
    persist(&store, "run-b", &engine);

    for employee in engine.state().employees.iter() {
        let events = store.events_for_employee("run-b", &employee.id).unwrap();
        assert_eq!(events, employee.history, "{} history differs", employee.id);
    }
    let ceo = store.events_for_employee("run-b", "EMP001").unwrap();
    assert_eq!(ceo[0].event_type, EventType::Employed);
    assert_eq!(ceo[0].role, Role::Ceo);
}

#[test]
fn placeholders_are_stored_but_not_counted() {
    let mut engine = SimEngine::new(start(), SimConfig::default()).unwrap();
    let ceo = engine.state().employees.iter().next().unwrap().id.clone();
    let vp = engine
        .hire(HireRequest::new(Role::Vp, start()).reporting_to(ceo))
        .unwrap();
    engine
        .hire(HireRequest::new(Role::Director, start()).reporting_to(vp.clone()))
        .unwrap();
    engine.mark_left(&vp, start());
    assert_eq!(engine.state().placeholders.len(), 1);

    let store = store();
    persist(&store, "run-c", &engine);

    let placeholders = store.placeholders("run-c").unwrap();
    assert_eq!(placeholders.len(), 1);
    assert!(placeholders[0].starts_with("TEMP"));
    assert_eq!(store.employee_count("run-c").unwrap(), 3);
    assert!(store.events_for_employee("run-c", &placeholders[0]).unwrap().is_empty());
}

#[test]
fn runs_are_kept_apart() {
    let store = store();
    for (run_id, seed) in [("run-1", 1), ("run-2", 2)] {
        let mut engine = SimEngine::new(start(), SimConfig::default().with_seed(seed)).unwrap();
        engine.simulate_for_days(60);
        persist(&store, run_id, &engine);
        assert_eq!(
            store.event_count(run_id).unwrap(),
            engine.state().event_log.len() as u64
        );
    }
}

#[test]
fn duplicate_run_id_is_rejected() {
    let store = store();
    let config = SimConfig::default();
    store.insert_run("run-x", "test", &config).unwrap();
    assert!(store.insert_run("run-x", "test", &config).is_err());
}

#[test]
fn file_database_persists_across_connections() {
    let path = std::env::temp_dir().join(format!("orgsim-store-{}.db", std::process::id()));
    let path_str = path.to_str().unwrap();
    let mut engine = SimEngine::new(start(), SimConfig::default().with_seed(4)).unwrap();
    engine.simulate_for_days(60);

    {
        let store = SimStore::open(path_str).expect("file database opens in WAL mode");
        store.migrate().unwrap();
        persist(&store, "run-file", &engine);
    }
    let reopened = SimStore::open(path_str).unwrap();
    let events = reopened.event_count("run-file").unwrap();
    drop(reopened);

    for suffix in ["", "-wal", "-shm"] {
        std::fs::remove_file(format!("{path_str}{suffix}")).ok();
    }
    assert_eq!(events, engine.state().event_log.len() as u64);
}
