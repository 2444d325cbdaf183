use crate::common::{CTNode, Path};

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub costs: usize,
    pub time_us: usize,
    pub low_level_expand_nodes: usize,
    pub high_level_expand_nodes: usize,
    pub replan_attempts: usize,
    pub constraints: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Cost {:?} Time(microseconds) {:?} High level expand nodes number: {:?} Low level expand nodes number {:?} Replan attempts {:?} Constraints {:?}",
            self.costs,
            self.time_us,
            self.high_level_expand_nodes,
            self.low_level_expand_nodes,
            self.replan_attempts,
            self.constraints
        );
    }
}

/// Read-only summary of an accepted node, for whoever records results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveSummary {
    pub paths: Vec<Path>,
    pub cost: usize,
    pub replan_attempts: usize,
    pub num_constraints: usize,
}

impl SolveSummary {
    pub fn new(node: &CTNode, replan_attempts: usize) -> Self {
        SolveSummary {
            paths: node.paths.clone(),
            cost: node.cost,
            replan_attempts,
            num_constraints: node.constraints.len(),
        }
    }
}
