//! Simulation parameters.
//!
//! RULE: SimConfig is immutable once an engine is built.
//! Every field has a default, so a JSON file only needs the fields it
//! overrides. Call validate() (SimEngine::new does) before use.

use crate::{
    error::{SimError, SimResult},
    types::{EventType, Role},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Relative weights of filling a vacancy by internal promotion or by
/// external hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStrategy {
    pub promote: u32,
    pub hire:    u32,
}

impl FillStrategy {
    pub const fn new(promote: u32, hire: u32) -> Self {
        Self { promote, hire }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub role_quotas: BTreeMap<Role, u32>,
    pub max_employees: u32,
    pub max_events_per_type: u32,
    pub max_events_per_day: u32,
    /// Poisson mean of the daily event budget.
    pub mean_events_per_day: f64,
    pub vacancy_fill_deadline_days: u32,
    pub min_employees_for_leaving: u32,
    pub promotion_order: BTreeMap<Role, Role>,
    pub allowed_manager_mapping: BTreeMap<Role, BTreeSet<Role>>,
    pub event_type_weights: BTreeMap<EventType, u32>,
    pub event_type_caps: BTreeMap<EventType, u32>,
    pub fill_strategies: BTreeMap<Role, FillStrategy>,
    pub min_events_per_week: u32,
    pub random_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            role_quotas: [
                (Role::Ceo, 1),
                (Role::Vp, 3),
                (Role::Director, 10),
                (Role::Manager, 10),
                (Role::SeniorAnalyst, 30),
                (Role::Analyst, 50),
            ]
            .into(),
            max_employees: 100,
            max_events_per_type: 3,
            max_events_per_day: 8,
            mean_events_per_day: 1.5,
            vacancy_fill_deadline_days: 14,
            min_employees_for_leaving: 30,
            promotion_order: [
                (Role::Analyst, Role::SeniorAnalyst),
                (Role::SeniorAnalyst, Role::Manager),
                (Role::Manager, Role::Director),
                (Role::Director, Role::Vp),
                (Role::Vp, Role::Ceo),
            ]
            .into(),
            allowed_manager_mapping: [
                (Role::Analyst, BTreeSet::from([Role::SeniorAnalyst, Role::Manager])),
                (Role::SeniorAnalyst, BTreeSet::from([Role::Manager])),
                (Role::Manager, BTreeSet::from([Role::Director])),
                (Role::Director, BTreeSet::from([Role::Vp])),
                (Role::Vp, BTreeSet::from([Role::Ceo])),
            ]
            .into(),
            event_type_weights: [
                (EventType::Employed, 4),
                (EventType::Promoted, 2),
                (EventType::Left, 1),
                (EventType::Change, 1),
            ]
            .into(),
            event_type_caps: [
                (EventType::Employed, 3),
                (EventType::Promoted, 3),
                (EventType::Left, 2),
                (EventType::Change, 2),
            ]
            .into(),
            fill_strategies: [
                (Role::Ceo, FillStrategy::new(1, 9)),
                (Role::Vp, FillStrategy::new(2, 8)),
                (Role::Director, FillStrategy::new(7, 3)),
                (Role::Manager, FillStrategy::new(5, 5)),
                (Role::SeniorAnalyst, FillStrategy::new(5, 5)),
                (Role::Analyst, FillStrategy::new(0, 1)),
            ]
            .into(),
            min_events_per_week: 1,
            random_seed: 42,
        }
    }
}

impl SimConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Reject configurations that would only fail later, mid-run.
    pub fn validate(&self) -> SimResult<()> {
        if self.max_employees == 0 {
            return Err(SimError::config("max_employees must be at least 1"));
        }
        for role in Role::ALL {
            if !self.role_quotas.contains_key(&role) {
                return Err(SimError::config(format!("role_quotas has no entry for {role}")));
            }
        }
        for (from, to) in &self.promotion_order {
            if !to.is_more_senior_than(*from) {
                return Err(SimError::config(format!(
                    "promotion_order maps {from} to {to}, which is not more senior"
                )));
            }
        }
        for role in Role::ALL.into_iter().filter(|r| *r != Role::Ceo) {
            let allowed = self.allowed_manager_mapping.get(&role);
            if allowed.map_or(true, |set| set.is_empty()) {
                return Err(SimError::config(format!(
                    "allowed_manager_mapping has no managers for {role}"
                )));
            }
        }
        if let Some(allowed) = self.allowed_manager_mapping.get(&Role::Ceo) {
            if !allowed.is_empty() {
                return Err(SimError::config("CEO cannot have an allowed manager"));
            }
        }
        for kind in EventType::ALL {
            if !self.event_type_weights.contains_key(&kind) {
                return Err(SimError::config(format!("event_type_weights has no entry for {kind}")));
            }
            if !self.event_type_caps.contains_key(&kind) {
                return Err(SimError::config(format!("event_type_caps has no entry for {kind}")));
            }
        }
        if self.event_type_weights.values().all(|w| *w == 0) {
            return Err(SimError::config("event_type_weights are all zero"));
        }
        if !self.mean_events_per_day.is_finite() || self.mean_events_per_day < 0.0 {
            return Err(SimError::config(format!(
                "mean_events_per_day must be a non-negative number, got {}",
                self.mean_events_per_day
            )));
        }
        Ok(())
    }

    pub fn quota(&self, role: Role) -> u32 {
        self.role_quotas.get(&role).copied().unwrap_or(0)
    }

    pub fn is_allowed_manager(&self, employee_role: Role, manager_role: Role) -> bool {
        self.allowed_manager_mapping
            .get(&employee_role)
            .is_some_and(|set| set.contains(&manager_role))
    }

    /// The role that is normally promoted into `to_role`.
    pub fn promotion_source(&self, to_role: Role) -> Option<Role> {
        self.promotion_order
            .iter()
            .find(|(_, to)| **to == to_role)
            .map(|(from, _)| *from)
    }

    /// Roles without an explicit strategy always hire externally.
    pub fn fill_strategy(&self, role: Role) -> FillStrategy {
        self.fill_strategies
            .get(&role)
            .copied()
            .unwrap_or(FillStrategy::new(0, 1))
    }

    pub fn event_weight(&self, kind: EventType) -> u32 {
        self.event_type_weights.get(&kind).copied().unwrap_or(0)
    }

    /// Daily cap for one event type: the per-type cap, bounded by the
    /// global per-type maximum.
    pub fn event_cap(&self, kind: EventType) -> u32 {
        self.event_type_caps
            .get(&kind)
            .copied()
            .unwrap_or(0)
            .min(self.max_events_per_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate().expect("default config validates");
    }

    #[test]
    fn promotion_source_inverts_promotion_order() {
        let config = SimConfig::default();
        assert_eq!(config.promotion_source(Role::Director), Some(Role::Manager));
        assert_eq!(config.promotion_source(Role::Analyst), None);
    }

    #[test]
    fn missing_quota_fails_fast() {
        let mut config = SimConfig::default();
        config.role_quotas.remove(&Role::Manager);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig { .. })));
    }

    #[test]
    fn demoting_promotion_order_is_rejected() {
        let mut config = SimConfig::default();
        config.promotion_order.insert(Role::Director, Role::Manager);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "max_employees": 40, "random_seed": 7 }"#).unwrap();
        assert_eq!(config.max_employees, 40);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.quota(Role::Analyst), 50);
        assert_eq!(config.event_weight(EventType::Employed), 4);
    }

    #[test]
    fn role_keyed_maps_use_labels() {
        let config: SimConfig = serde_json::from_str(
            r#"{ "role_quotas": { "CEO": 1, "VP": 2, "Director": 4, "Manager": 8,
                                  "Senior Analyst": 16, "Analyst": 32 } }"#,
        )
        .unwrap();
        assert_eq!(config.quota(Role::SeniorAnalyst), 16);
        config.validate().unwrap();
    }

    #[test]
    fn event_cap_is_bounded_by_max_events_per_type() {
        let mut config = SimConfig::default();
        config.max_events_per_type = 2;
        assert_eq!(config.event_cap(EventType::Employed), 2);
        assert_eq!(config.event_cap(EventType::Left), 2);
    }
}
