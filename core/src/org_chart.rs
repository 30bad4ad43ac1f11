//! Point-in-time org chart, rebuilt from the event log.
//!
//! Every event is a full snapshot of its subject, so the latest event per
//! employee at or before a date is that employee's position on that date.
//! Placeholders never appear in the log. When a node reports to one, the
//! placeholder is added as a structural node so the chart stays connected.

use crate::{
    state::OrgState,
    types::{EmployeeId, EventType, Role, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgChartNode {
    pub id:          EmployeeId,
    pub parent_id:   Option<EmployeeId>,
    pub role:        Role,
    pub department:  Option<String>,
    pub team:        Option<String>,
    /// Marks a vacated slot, not a person. Its role is not a seniority signal.
    pub placeholder: bool,
}

/// Nodes are returned in order of each employee's first event.
pub fn org_chart_at(state: &OrgState, date: SimDate) -> Vec<OrgChartNode> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, usize> = HashMap::new();
    for (i, event) in state.event_log.iter().enumerate() {
        if event.date > date {
            continue;
        }
        if latest.insert(event.employee_id.as_str(), i).is_none() {
            order.push(event.employee_id.as_str());
        }
    }

    let mut nodes: Vec<OrgChartNode> = order
        .into_iter()
        .filter_map(|id| latest.get(id).map(|&i| &state.event_log[i]))
        .filter(|event| event.event_type != EventType::Left)
        .map(|event| OrgChartNode {
            id:          event.employee_id.clone(),
            parent_id:   event.manager_id.clone(),
            role:        event.role,
            department:  event.department.clone(),
            team:        event.team.clone(),
            placeholder: false,
        })
        .collect();

    let present: HashSet<EmployeeId> = nodes.iter().map(|n| n.id.clone()).collect();
    let mut added: HashSet<EmployeeId> = HashSet::new();
    let mut structural = Vec::new();
    for parent_id in nodes.iter().filter_map(|n| n.parent_id.as_ref()) {
        if present.contains(parent_id) || added.contains(parent_id) {
            continue;
        }
        if let Some(p) = state.placeholders.get(parent_id) {
            added.insert(parent_id.clone());
            structural.push(OrgChartNode {
                id:          p.id.clone(),
                parent_id:   p.manager_id.clone(),
                role:        p.role,
                department:  p.department.clone(),
                team:        p.team.clone(),
                placeholder: true,
            });
        }
    }
    nodes.extend(structural);
    nodes
}
