use anyhow::{bail, Result};
use rand::prelude::*;
use tracing::info;

use crate::common::{Agent, Instance};
use crate::map::Map;

/// Random instance generator: a grid with scattered obstacles and agents
/// placed on free cells.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub height: usize,
    pub width: usize,
    pub obstacle_ratio: f64,
}

impl Scenario {
    fn generate_map<R: Rng + ?Sized>(&self, rng: &mut R) -> Map {
        let mut map = Map::new(self.height, self.width);
        for x in 0..self.height {
            for y in 0..self.width {
                if rng.gen_bool(self.obstacle_ratio) {
                    map.set_obstacle(x, y);
                }
            }
        }
        map
    }

    /// Distinct starts and distinct goals, each on a free cell. Reachability
    /// is left to the solver.
    pub fn generate_instance<R: Rng + ?Sized>(
        &self,
        num_agents: usize,
        rng: &mut R,
    ) -> Result<Instance> {
        if !(0.0..1.0).contains(&self.obstacle_ratio) {
            bail!(
                "obstacle ratio must be in [0, 1), got {}",
                self.obstacle_ratio
            );
        }

        let map = self.generate_map(rng);
        let free_cells: Vec<(usize, usize)> = (0..map.height)
            .flat_map(|x| (0..map.width).map(move |y| (x, y)))
            .filter(|&(x, y)| map.is_passable(x, y))
            .collect();

        if free_cells.len() < num_agents {
            bail!(
                "only {} free cells for {num_agents} agents",
                free_cells.len()
            );
        }

        let starts: Vec<(usize, usize)> = free_cells
            .choose_multiple(rng, num_agents)
            .copied()
            .collect();
        let goals: Vec<(usize, usize)> = free_cells
            .choose_multiple(rng, num_agents)
            .copied()
            .collect();

        let agents: Vec<Agent> = starts
            .into_iter()
            .zip(goals)
            .enumerate()
            .map(|(id, (start, goal))| Agent { id, start, goal })
            .collect();

        info!("Generate scen: {agents:?}");
        Instance::new(map, agents)
    }
}
