//! Export / import round trips and strict import.

use orgsim_core::{snapshot::SimExport, SimConfig, SimDate, SimEngine, SimError};

fn start() -> SimDate {
    SimDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn run(seed: u64, days: u32) -> SimEngine {
    let mut engine = SimEngine::new(start(), SimConfig::default().with_seed(seed)).unwrap();
    engine.simulate_for_days(days);
    engine
}

fn assert_malformed<T>(result: Result<T, SimError>, what: &str) {
    match result {
        Err(SimError::MalformedState { .. }) => {}
        Err(other) => panic!("{what}: expected MalformedState, got {other}"),
        Ok(_) => panic!("{what}: import should have failed"),
    }
}

#[test]
fn export_import_preserves_statistics_and_log() {
    let engine = run(42, 250);
    let json = engine.to_json().unwrap();

    let loaded = SimEngine::from_json(&json, engine.config().clone()).unwrap();

    assert_eq!(loaded.compute_statistics(), engine.compute_statistics());
    assert_eq!(loaded.state().event_log, engine.state().event_log);
    assert_eq!(loaded.today(), engine.today());
    assert_eq!(loaded.export(), engine.export());
    loaded.check_invariants().expect("a loaded state is consistent");
}

#[test]
fn export_uses_documented_field_names() {
    let engine = run(1, 60);
    let value: serde_json::Value = serde_json::from_str(&engine.to_json().unwrap()).unwrap();

    for key in ["employees", "temp_employees", "vacancies", "event_log", "start_date", "current_date"] {
        assert!(value.get(key).is_some(), "export is missing {key}");
    }
    assert_eq!(value["start_date"], "2024-01-01");
    assert_eq!(value["current_date"], "2024-03-01");
    let first = &value["event_log"][0];
    assert_eq!(first["event_type"], "employed");
    assert_eq!(first["role"], "CEO");
    assert_eq!(first["date"], "2024-01-01");
}

#[test]
fn loaded_engine_continues_id_sequence() {
    let engine = run(7, 120);
    let highest = engine
        .state()
        .employees
        .iter()
        .chain(engine.state().placeholders.iter())
        .filter_map(|e| e.id.trim_start_matches(char::is_alphabetic).parse::<u64>().ok())
        .max()
        .unwrap();

    let loaded = SimEngine::load(engine.export(), engine.config().clone()).unwrap();
    assert_eq!(loaded.state().id_counter(), highest);

    let mut state = loaded.state().clone();
    let new_id = state.next_id("EMP");
    assert_eq!(new_id, format!("EMP{:03}", highest + 1));
}

#[test]
fn loaded_engine_keeps_running() {
    let engine = run(9, 100);
    let mut loaded = SimEngine::load(engine.export(), engine.config().clone()).unwrap();
    let events_before = loaded.state().event_log.len();

    for _ in 0..100 {
        loaded.simulate_one_day();
        loaded.check_invariants().unwrap();
    }
    assert!(loaded.state().event_log.len() >= events_before);
    assert_eq!(loaded.today(), SimDate::from_ymd_opt(2024, 7, 19).unwrap());
}

#[test]
fn json_file_round_trip() {
    let engine = run(3, 90);
    let path = std::env::temp_dir().join(format!("orgsim-export-{}.json", std::process::id()));
    let path = path.to_str().unwrap();

    engine.save_to_json(path).unwrap();
    let loaded = SimEngine::load_from_json(path, engine.config().clone()).unwrap();
    std::fs::remove_file(path).ok();

    assert_eq!(loaded.export(), engine.export());
}

#[test]
fn datetime_strings_are_accepted_on_import() {
    let engine = run(4, 10);
    let json = engine
        .to_json()
        .unwrap()
        .replace("\"2024-01-01\"", "\"2024-01-01T00:00:00\"");

    let loaded = SimEngine::from_json(&json, engine.config().clone()).unwrap();
    assert_eq!(loaded.state().clock.start_date, start());
}

// ── Strict import ──────────────────────────────────────────────

#[test]
fn missing_required_field_is_malformed() {
    let engine = run(5, 30);
    let mut value: serde_json::Value = serde_json::from_str(&engine.to_json().unwrap()).unwrap();
    value.as_object_mut().unwrap().remove("event_log");

    assert_malformed(
        SimEngine::from_json(&value.to_string(), SimConfig::default()),
        "missing event_log",
    );
    assert_malformed(SimEngine::from_json("not json", SimConfig::default()), "garbage");
}

#[test]
fn duplicate_ids_are_malformed() {
    let engine = run(6, 30);
    let mut export = engine.export();
    let first = export.employees[0].clone();
    export.employees.push(first);

    assert_malformed(SimEngine::load(export, SimConfig::default()), "duplicate id");
}

#[test]
fn unexpected_id_format_is_malformed() {
    let engine = run(6, 30);
    let mut export: SimExport = engine.export();
    export.employees[0].id = "BOSS".into();

    assert_malformed(SimEngine::load(export, SimConfig::default()), "bad id");
}

#[test]
fn empty_history_is_malformed() {
    let engine = run(6, 30);
    let mut export = engine.export();
    export.employees[0].history.clear();

    assert_malformed(SimEngine::load(export, SimConfig::default()), "empty history");
}

#[test]
fn invalid_config_fails_before_import() {
    let engine = run(6, 10);
    let config = SimConfig { max_employees: 0, ..SimConfig::default() };
    assert!(matches!(
        SimEngine::load(engine.export(), config),
        Err(SimError::InvalidConfig { .. })
    ));
}
