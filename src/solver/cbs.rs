use super::prioritizer::{CollisionPrioritizer, Identity};
use super::Solver;
use crate::algorithm::a_star_search;
use crate::common::{
    detect_collisions, resolve_collision, sum_of_costs, CTNode, Collision, Constraint, Instance,
    Path, Solution,
};
use crate::error::SolveError;
use crate::stat::Stats;

use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, warn};

pub struct CBS {
    instance: Instance,
    prioritizer: Box<dyn CollisionPrioritizer>,
    node_limit: Option<usize>,
    stats: Stats,
    next_id: usize,
}

impl CBS {
    pub fn new(instance: &Instance) -> Self {
        CBS {
            instance: instance.clone(),
            prioritizer: Box::new(Identity),
            node_limit: None,
            stats: Stats::default(),
            next_id: 0,
        }
    }

    pub fn with_prioritizer(mut self, prioritizer: Box<dyn CollisionPrioritizer>) -> Self {
        self.prioritizer = prioritizer;
        self
    }

    /// Stop after `limit` high level expansions.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Statistics of the last solve.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Same search as [`Solver::solve`], but counts every child replan in
    /// `counter` and reports an unsolved instance as `None`.
    pub fn safe_solve(&mut self, counter: &mut usize) -> Option<CTNode> {
        match self.search(counter) {
            Ok(node) => Some(node),
            Err(err) => {
                debug!("{err}");
                None
            }
        }
    }

    fn search(&mut self, counter: &mut usize) -> Result<CTNode, SolveError> {
        let total_solve_start_time = Instant::now();
        self.stats = Stats::default();
        self.next_id = 0;
        let counter_start = *counter;

        let mut open = BTreeSet::new();
        open.insert(self.create_root()?);

        while let Some(current_node) = open.pop_first() {
            if current_node.is_goal() {
                let replan_attempts = *counter - counter_start;
                self.finish_stats(total_solve_start_time, replan_attempts, &current_node);
                return Ok(current_node);
            }

            if let Some(limit) = self.node_limit {
                if self.stats.high_level_expand_nodes >= limit {
                    // The popped node is the best one left on the frontier.
                    let replan_attempts = *counter - counter_start;
                    self.finish_stats(total_solve_start_time, replan_attempts, &current_node);
                    return Err(SolveError::NodeLimitReached {
                        limit,
                        best: Box::new(current_node),
                    });
                }
            }

            self.stats.high_level_expand_nodes += 1;
            let collision = current_node.collisions[0];
            debug!(
                "expand node {} cost {}: {collision:?}",
                current_node.id, current_node.cost
            );

            for constraint in resolve_collision(&collision) {
                *counter += 1;
                if let Some(child) = self.create_child(&current_node, constraint) {
                    open.insert(child);
                } else {
                    debug!("prune branch of node {} on {constraint:?}", current_node.id);
                }
            }
        }

        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.replan_attempts = *counter - counter_start;
        self.stats.print();
        Err(SolveError::UnsolvableAfterBranching {
            expanded: self.stats.high_level_expand_nodes,
        })
    }

    /// Records the outcome of a search that stopped on `node`.
    fn finish_stats(&mut self, start_time: Instant, replan_attempts: usize, node: &CTNode) {
        self.stats.time_us = start_time.elapsed().as_micros() as usize;
        self.stats.costs = node.cost;
        self.stats.replan_attempts = replan_attempts;
        self.stats.constraints = node.constraints.len();
        self.stats.print();
    }

    fn create_root(&mut self) -> Result<CTNode, SolveError> {
        let mut paths = Vec::with_capacity(self.instance.num_agents());
        for agent in &self.instance.agents {
            match a_star_search(&self.instance.map, agent, &[], &mut self.stats) {
                Some(path) => paths.push(path),
                None => return Err(SolveError::UnsolvableFromRoot { agent: agent.id }),
            }
        }

        Ok(self.build_node(paths, Vec::new()))
    }

    /// Child of `parent` with one extra constraint, where only the
    /// constrained agent is replanned. `None` when that agent has no path.
    fn create_child(&mut self, parent: &CTNode, constraint: Constraint) -> Option<CTNode> {
        let agent_to_update = constraint.agent();

        let mut new_constraints = parent.constraints.clone();
        new_constraints.push(constraint);

        let mut new_paths = parent.paths.clone();
        new_paths[agent_to_update] = a_star_search(
            &self.instance.map,
            &self.instance.agents[agent_to_update],
            &new_constraints,
            &mut self.stats,
        )?;

        debug!(
            "update agent {agent_to_update:?} with path {:?}",
            new_paths[agent_to_update]
        );
        Some(self.build_node(new_paths, new_constraints))
    }

    fn build_node(&mut self, paths: Vec<Path>, constraints: Vec<Constraint>) -> CTNode {
        let mut node = CTNode {
            cost: sum_of_costs(&paths),
            collisions: detect_collisions(&paths),
            paths,
            constraints,
            id: self.next_id,
        };
        self.next_id += 1;
        node.collisions = self.order_collisions(&node);
        node
    }

    /// Runs the prioritizer, keeping only collisions that were actually
    /// detected and never leaving a colliding node without any.
    fn order_collisions(&self, node: &CTNode) -> Vec<Collision> {
        if node.collisions.is_empty() {
            return Vec::new();
        }

        let ordered: Vec<Collision> = self
            .prioritizer
            .prioritize(node, node.collisions.clone())
            .into_iter()
            .filter(|collision| node.collisions.contains(collision))
            .collect();

        if ordered.is_empty() {
            warn!(
                "prioritizer dropped all {} collisions of node {}, keeping detection order",
                node.collisions.len(),
                node.id
            );
            return node.collisions.clone();
        }
        ordered
    }
}

impl Solver for CBS {
    fn solve(&mut self) -> Result<Solution, SolveError> {
        let mut counter = 0;
        let node = self.search(&mut counter)?;
        Ok(Solution { paths: node.paths })
    }
}
