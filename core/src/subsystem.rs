//! Shared context for the rule subsystems.
//!
//! RULE: Rule subsystems are stateless. Everything they read or write
//! lives in the OrgState passed to them through a SimContext.
//! RULE: A rejected action returns None/false and leaves the state
//! untouched. Rejections are expected during autonomous simulation and
//! are never errors.
//!
//! Execution order within a day is fixed by the scheduler (scheduler.rs).

use crate::{config::SimConfig, rng::SimRng, state::OrgState};

pub struct SimContext<'a> {
    pub state:  &'a mut OrgState,
    pub config: &'a SimConfig,
    pub rng:    &'a mut SimRng,
}

impl<'a> SimContext<'a> {
    pub fn new(state: &'a mut OrgState, config: &'a SimConfig, rng: &'a mut SimRng) -> Self {
        Self { state, config, rng }
    }
}
