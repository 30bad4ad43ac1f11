//! SQLite export of finished runs.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never needs a store to run. Callers persist an export and
//! its statistics once a run (or a sweep entry) is done.

use crate::{
    config::SimConfig,
    error::SimResult,
    event::Event,
    snapshot::SimExport,
    statistics::SimStatistics,
    types::iso_date,
};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the export database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: readers don't block the writer during a sweep.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        version: &str,
        config: &SimConfig,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, config_json) VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                config.random_seed as i64,
                version,
                serde_json::to_string(config)?,
            ],
        )?;
        Ok(())
    }

    // ── Export ─────────────────────────────────────────────────

    /// Write every employee, placeholder and logged event of an export in
    /// one transaction.
    pub fn save_export(&self, run_id: &str, export: &SimExport) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE run SET start_date = ?1, end_date = ?2 WHERE run_id = ?3",
            params![
                export.start_date.to_string(),
                export.current_date.to_string(),
                run_id,
            ],
        )?;
        {
            let mut insert_employee = tx.prepare(
                "INSERT INTO employee
                   (run_id, employee_id, role, manager_id, department, team,
                    hire_date, active, placeholder)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            let people = export
                .employees
                .iter()
                .map(|e| (e, false))
                .chain(export.temp_employees.iter().map(|e| (e, true)));
            for (e, placeholder) in people {
                insert_employee.execute(params![
                    run_id,
                    e.id,
                    e.role.label(),
                    e.manager_id,
                    e.department,
                    e.team,
                    e.hire_date.to_string(),
                    e.active,
                    placeholder,
                ])?;
            }

            let mut insert_event = tx.prepare(
                "INSERT INTO event_log
                   (run_id, seq, event_date, event_type, employee_id, role,
                    manager_id, department, team)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (seq, ev) in export.event_log.iter().enumerate() {
                insert_event.execute(params![
                    run_id,
                    seq as i64,
                    ev.date.to_string(),
                    ev.event_type.name(),
                    ev.employee_id,
                    ev.role.label(),
                    ev.manager_id,
                    ev.department,
                    ev.team,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!(
            "run={run_id} saved {} employees, {} events",
            export.employees.len() + export.temp_employees.len(),
            export.event_log.len()
        );
        Ok(())
    }

    pub fn save_statistics(&self, run_id: &str, stats: &SimStatistics) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (name, value) in stats.to_map() {
            tx.execute(
                "INSERT OR REPLACE INTO run_statistic (run_id, name, value) VALUES (?1, ?2, ?3)",
                params![run_id, name, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    /// Real employees only; placeholders are excluded.
    pub fn employee_count(&self, run_id: &str) -> SimResult<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM employee WHERE run_id = ?1 AND placeholder = 0",
            params![run_id],
            |r| r.get(0),
        )?;
        Ok(n as u64)
    }

    pub fn event_count(&self, run_id: &str) -> SimResult<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |r| r.get(0),
        )?;
        Ok(n as u64)
    }

    pub fn statistic(&self, run_id: &str, name: &str) -> SimResult<Option<f64>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM run_statistic WHERE run_id = ?1 AND name = ?2",
                params![run_id, name],
                |r| r.get::<_, f64>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// The logged history of one employee, in log order.
    pub fn events_for_employee(&self, run_id: &str, employee_id: &str) -> SimResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_date, event_type, employee_id, role, manager_id, department, team
             FROM event_log WHERE run_id = ?1 AND employee_id = ?2
             ORDER BY seq ASC",
        )?;
        let events = stmt
            .query_map(params![run_id, employee_id], event_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    pub fn placeholders(&self, run_id: &str) -> SimResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id FROM employee
             WHERE run_id = ?1 AND placeholder = 1 ORDER BY employee_id",
        )?;
        let ids = stmt
            .query_map(params![run_id], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

fn parsed<T>(
    idx: usize,
    raw: String,
    parse: impl Fn(&str) -> Result<T, String>,
) -> rusqlite::Result<T> {
    parse(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn event_from_row(r: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        date:        parsed(0, r.get(0)?, iso_date::parse)?,
        event_type:  parsed(1, r.get(1)?, str::parse)?,
        employee_id: r.get(2)?,
        role:        parsed(3, r.get(3)?, str::parse)?,
        manager_id:  r.get(4)?,
        department:  r.get(5)?,
        team:        r.get(6)?,
    })
}
