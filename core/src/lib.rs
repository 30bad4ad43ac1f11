//! Organisation headcount simulator.
//!
//! A seeded, day-by-day simulation of hiring, promotion, departure and
//! reporting-line changes under role quotas. Start with [`SimEngine`].

pub mod clock;
pub mod config;
pub mod departure_subsystem;
pub mod engine;
pub mod error;
pub mod event;
pub mod hiring_subsystem;
pub mod invariants;
pub mod org_chart;
pub mod promotion_subsystem;
pub mod reassignment_subsystem;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod statistics;
pub mod store;
pub mod subsystem;
pub mod types;
pub mod vacancy_subsystem;

pub use config::SimConfig;
pub use engine::SimEngine;
pub use error::{SimError, SimResult};
pub use types::{EmployeeId, EventType, Role, SimDate};
