mod highlevel;
mod lowlevel;

pub use highlevel::{
    detect_collision, detect_collisions, get_location, resolve_collision, sum_of_costs, CTNode,
    Collision, CollisionType, Constraint,
};
pub(crate) use lowlevel::LowLevelNode;

use crate::map::{manhattan_distance, Map};

use anyhow::bail;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: usize,
    pub start: (usize, usize),
    pub goal: (usize, usize),
}

impl Agent {
    pub fn verify(&self, map: &Map) -> bool {
        map.is_passable(self.start.0, self.start.1) && map.is_passable(self.goal.0, self.goal.1)
    }
}

pub type Path = Vec<(usize, usize)>;

/// A MAPF problem: the map plus one agent per index.
#[derive(Debug, Clone)]
pub struct Instance {
    pub map: Map,
    pub agents: Vec<Agent>,
}

impl Instance {
    pub fn new(map: Map, agents: Vec<Agent>) -> anyhow::Result<Self> {
        for (index, agent) in agents.iter().enumerate() {
            if agent.id != index {
                bail!("agent at index {index} has id {}", agent.id);
            }
            if !agent.verify(&map) {
                bail!(
                    "agent {} has a blocked or out-of-bounds start {:?} or goal {:?}",
                    agent.id,
                    agent.start,
                    agent.goal
                );
            }
        }
        Ok(Instance { map, agents })
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub paths: Vec<Path>,
}

impl Solution {
    pub fn cost(&self) -> usize {
        sum_of_costs(&self.paths)
    }

    /// Checks that every path is a legal walk from start to goal and that no
    /// two agents collide.
    pub fn verify(&self, map: &Map, agents: &[Agent]) -> bool {
        if self.paths.len() != agents.len() {
            return false;
        }

        for (agent, path) in agents.iter().zip(&self.paths) {
            if path.first() != Some(&agent.start) || path.last() != Some(&agent.goal) {
                return false;
            }
            if path.iter().any(|&(x, y)| !map.is_passable(x, y)) {
                return false;
            }
            if path
                .windows(2)
                .any(|step| manhattan_distance(step[0], step[1]) > 1)
            {
                return false;
            }
        }

        detect_collisions(&self.paths).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Map {
        Map::from_rows(&["...", "@.@"]).unwrap()
    }

    #[test]
    fn test_instance_rejects_blocked_goal() {
        let agents = vec![Agent {
            id: 0,
            start: (0, 0),
            goal: (1, 0),
        }];
        assert!(Instance::new(corridor(), agents).is_err());
    }

    #[test]
    fn test_instance_rejects_misnumbered_agents() {
        let agents = vec![Agent {
            id: 1,
            start: (0, 0),
            goal: (0, 2),
        }];
        assert!(Instance::new(corridor(), agents).is_err());
    }

    #[test]
    fn test_solution_verify() {
        let map = corridor();
        let agents = vec![
            Agent {
                id: 0,
                start: (0, 0),
                goal: (0, 2),
            },
            Agent {
                id: 1,
                start: (0, 2),
                goal: (0, 0),
            },
        ];

        let good = Solution {
            paths: vec![
                vec![(0, 0), (0, 1), (1, 1), (1, 1), (0, 1), (0, 2)],
                vec![(0, 2), (0, 2), (0, 2), (0, 1), (0, 0)],
            ],
        };
        assert!(good.verify(&map, &agents));
        assert_eq!(good.cost(), 9);

        // Head-on swap along the corridor.
        let swap = Solution {
            paths: vec![
                vec![(0, 0), (0, 1), (0, 2)],
                vec![(0, 2), (0, 1), (0, 0)],
            ],
        };
        assert!(!swap.verify(&map, &agents));

        // Teleports through the wall.
        let jump = Solution {
            paths: vec![vec![(0, 0), (0, 2)], vec![(0, 2), (1, 1), (0, 1), (0, 0)]],
        };
        assert!(!jump.verify(&map, &agents));
    }
}
