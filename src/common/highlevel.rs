use super::Path;

use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use tracing::trace;

/// A prohibition on one agent, indexed by the time step at which the
/// forbidden vertex would be occupied or the forbidden move would arrive.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize)]
pub enum Constraint {
    Vertex {
        agent: usize,
        position: (usize, usize),
        time_step: usize,
    },
    Edge {
        agent: usize,
        from_position: (usize, usize),
        to_position: (usize, usize),
        to_time_step: usize,
    },
}

impl Constraint {
    pub fn agent(&self) -> usize {
        match *self {
            Constraint::Vertex { agent, .. } | Constraint::Edge { agent, .. } => agent,
        }
    }

    pub fn time_step(&self) -> usize {
        match *self {
            Constraint::Vertex { time_step, .. } => time_step,
            Constraint::Edge { to_time_step, .. } => to_time_step,
        }
    }

    /// Whether `agent` moving from `from` to `to`, arriving at `time`, breaks
    /// this constraint.
    pub fn is_violated(
        &self,
        agent: usize,
        from: (usize, usize),
        to: (usize, usize),
        time: usize,
    ) -> bool {
        if agent != self.agent() {
            return false;
        }

        match *self {
            Constraint::Vertex {
                position,
                time_step,
                ..
            } => to == position && time == time_step,
            Constraint::Edge {
                from_position,
                to_position,
                to_time_step,
                ..
            } => from == from_position && to == to_position && time == to_time_step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollisionType {
    Vertex {
        position: (usize, usize),
        time_step: usize,
    },
    /// `agent_1` moves `from -> to` while `agent_2` moves `to -> from`,
    /// both arriving at `time_step`.
    Edge {
        from: (usize, usize),
        to: (usize, usize),
        time_step: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub agent_1: usize,
    pub agent_2: usize,
    pub collision_type: CollisionType,
}

impl Collision {
    pub fn time_step(&self) -> usize {
        match self.collision_type {
            CollisionType::Vertex { time_step, .. } | CollisionType::Edge { time_step, .. } => {
                time_step
            }
        }
    }
}

/// Position of an agent at `time`; agents that already arrived keep
/// occupying their goal.
pub fn get_location(path: &[(usize, usize)], time: usize) -> (usize, usize) {
    path.get(time)
        .or_else(|| path.last())
        .copied()
        .unwrap_or_default()
}

/// First conflict between two paths, vertex checked before edge at each
/// time step.
pub fn detect_collision(
    agent_1: usize,
    agent_2: usize,
    path_1: &[(usize, usize)],
    path_2: &[(usize, usize)],
) -> Option<Collision> {
    let max_length = path_1.len().max(path_2.len());

    for step in 0..max_length {
        let pos1 = get_location(path_1, step);
        let pos2 = get_location(path_2, step);

        if pos1 == pos2 {
            return Some(Collision {
                agent_1,
                agent_2,
                collision_type: CollisionType::Vertex {
                    position: pos1,
                    time_step: step,
                },
            });
        }

        let next_pos1 = get_location(path_1, step + 1);
        let next_pos2 = get_location(path_2, step + 1);

        if pos1 == next_pos2 && next_pos1 == pos2 {
            return Some(Collision {
                agent_1,
                agent_2,
                collision_type: CollisionType::Edge {
                    from: pos1,
                    to: next_pos1,
                    time_step: step + 1,
                },
            });
        }
    }

    None
}

/// At most one collision per unordered agent pair, pairs in `(i, j)` order.
pub fn detect_collisions(paths: &[Path]) -> Vec<Collision> {
    let mut collisions = Vec::new();

    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            if let Some(collision) = detect_collision(i, j, &paths[i], &paths[j]) {
                collisions.push(collision);
            }
        }
    }

    trace!("detect collisions: {collisions:?}");
    collisions
}

/// Splits a collision into the pair of constraints, first for `agent_1` and
/// then for `agent_2`.
pub fn resolve_collision(collision: &Collision) -> [Constraint; 2] {
    match collision.collision_type {
        CollisionType::Vertex {
            position,
            time_step,
        } => [
            Constraint::Vertex {
                agent: collision.agent_1,
                position,
                time_step,
            },
            Constraint::Vertex {
                agent: collision.agent_2,
                position,
                time_step,
            },
        ],
        CollisionType::Edge {
            from,
            to,
            time_step,
        } => [
            Constraint::Edge {
                agent: collision.agent_1,
                from_position: from,
                to_position: to,
                to_time_step: time_step,
            },
            Constraint::Edge {
                agent: collision.agent_2,
                from_position: to,
                to_position: from,
                to_time_step: time_step,
            },
        ],
    }
}

/// Sum over agents of path length minus the start cell.
pub fn sum_of_costs(paths: &[Path]) -> usize {
    paths.iter().map(|path| path.len().saturating_sub(1)).sum()
}

/// Constraint-tree node. Each node owns its paths and constraints, children
/// are built from a copy of their parent.
#[derive(Clone, Debug)]
pub struct CTNode {
    pub cost: usize,
    pub paths: Vec<Path>,
    pub collisions: Vec<Collision>,
    pub constraints: Vec<Constraint>,
    pub id: usize,
}

impl CTNode {
    /// Frontier key: lower cost, then fewer collisions, then the more
    /// recently created node.
    pub fn priority(&self) -> (usize, usize, Reverse<usize>) {
        (self.cost, self.collisions.len(), Reverse(self.id))
    }

    pub fn is_goal(&self) -> bool {
        self.collisions.is_empty()
    }
}

impl PartialEq for CTNode {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority()
    }
}

impl Eq for CTNode {}

// Smaller means better, the open list pops its first element.
impl Ord for CTNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CTNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn node(cost: usize, num_collisions: usize, id: usize) -> CTNode {
        let collision = Collision {
            agent_1: 0,
            agent_2: 1,
            collision_type: CollisionType::Vertex {
                position: (0, 0),
                time_step: 1,
            },
        };
        CTNode {
            cost,
            paths: Vec::new(),
            collisions: vec![collision; num_collisions],
            constraints: Vec::new(),
            id,
        }
    }

    #[test]
    fn test_vertex_collision() {
        let path_1 = vec![(0, 0), (0, 1), (0, 2)];
        let path_2 = vec![(1, 1), (0, 1), (1, 1)];

        let collision = detect_collision(0, 1, &path_1, &path_2).unwrap();
        assert_eq!(
            collision.collision_type,
            CollisionType::Vertex {
                position: (0, 1),
                time_step: 1
            }
        );
    }

    #[test]
    fn test_edge_collision() {
        let path_1 = vec![(0, 0), (0, 1), (0, 2), (0, 3)];
        let path_2 = vec![(0, 3), (0, 2), (0, 1), (0, 0)];

        let collision = detect_collision(0, 1, &path_1, &path_2).unwrap();
        assert_eq!(
            collision.collision_type,
            CollisionType::Edge {
                from: (0, 1),
                to: (0, 2),
                time_step: 2
            }
        );
    }

    #[test]
    fn test_collision_with_agent_holding_goal() {
        // Agent 0 arrived at (0, 1) at t = 1 and stays there.
        let path_1 = vec![(0, 0), (0, 1)];
        let path_2 = vec![(1, 2), (1, 1), (1, 0), (0, 0), (0, 1)];

        let collision = detect_collision(0, 1, &path_1, &path_2).unwrap();
        assert_eq!(
            collision.collision_type,
            CollisionType::Vertex {
                position: (0, 1),
                time_step: 4
            }
        );
        assert_eq!(get_location(&path_1, 10), (0, 1));
    }

    #[test]
    fn test_no_collision_when_following() {
        let path_1 = vec![(0, 1), (0, 2), (0, 3)];
        let path_2 = vec![(0, 0), (0, 1), (0, 2)];
        assert!(detect_collision(0, 1, &path_1, &path_2).is_none());
    }

    #[test]
    fn test_detect_collisions_one_per_pair() {
        let paths = vec![
            vec![(0, 0), (0, 1), (0, 2)],
            vec![(1, 1), (0, 1), (0, 2)],
            vec![(5, 5), (5, 5), (5, 5)],
        ];

        let collisions = detect_collisions(&paths);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].agent_1, 0);
        assert_eq!(collisions[0].agent_2, 1);
        assert_eq!(collisions[0].time_step(), 1);
    }

    #[test]
    fn test_resolve_edge_collision_reverses_second_move() {
        let collision = Collision {
            agent_1: 2,
            agent_2: 5,
            collision_type: CollisionType::Edge {
                from: (0, 1),
                to: (0, 2),
                time_step: 2,
            },
        };

        let [first, second] = resolve_collision(&collision);
        assert!(first.is_violated(2, (0, 1), (0, 2), 2));
        assert!(!first.is_violated(5, (0, 1), (0, 2), 2));
        assert!(second.is_violated(5, (0, 2), (0, 1), 2));
        assert!(!second.is_violated(5, (0, 1), (0, 2), 2));
        assert!(!second.is_violated(5, (0, 2), (0, 1), 3));
    }

    #[test]
    fn test_resolve_vertex_collision() {
        let collision = Collision {
            agent_1: 0,
            agent_2: 1,
            collision_type: CollisionType::Vertex {
                position: (3, 3),
                time_step: 4,
            },
        };

        let constraints = resolve_collision(&collision);
        assert_eq!(constraints[0].agent(), 0);
        assert_eq!(constraints[1].agent(), 1);
        for constraint in constraints {
            assert_eq!(constraint.time_step(), 4);
            // Any move into the cell at that time is forbidden, waits included.
            assert!(constraint.is_violated(constraint.agent(), (3, 3), (3, 3), 4));
            assert!(constraint.is_violated(constraint.agent(), (2, 3), (3, 3), 4));
            assert!(!constraint.is_violated(constraint.agent(), (2, 3), (3, 3), 5));
        }
    }

    #[test]
    fn test_sum_of_costs() {
        let paths = vec![vec![(0, 0)], vec![(0, 0), (0, 1), (0, 2)]];
        assert_eq!(sum_of_costs(&paths), 2);
    }

    #[test]
    fn test_node_order() {
        let mut open = BTreeSet::new();
        open.insert(node(5, 0, 1));
        open.insert(node(4, 2, 2));
        open.insert(node(4, 1, 3));
        open.insert(node(4, 1, 4));

        let order: Vec<usize> = std::iter::from_fn(|| open.pop_first())
            .map(|node| node.id)
            .collect();
        // Ties on cost and collisions go to the newest node.
        assert_eq!(order, vec![4, 3, 2, 1]);
    }
}
