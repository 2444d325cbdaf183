use super::construct_path;
use crate::common::{Agent, Constraint, LowLevelNode, Path};
use crate::map::{manhattan_distance, Map};
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// Time-expanded A* for one agent. Only constraints addressed to `agent`
/// are considered; the returned path is a shortest one that honours all of
/// them, including while the agent rests on its goal afterwards.
#[instrument(skip_all, name="a_star", fields(agent = agent.id, start = format!("{:?}", agent.start), goal = format!("{:?}", agent.goal)), level = "debug")]
pub fn a_star_search(
    map: &Map,
    agent: &Agent,
    constraints: &[Constraint],
    stats: &mut Stats,
) -> Option<Path> {
    let constraints: Vec<&Constraint> = constraints
        .iter()
        .filter(|constraint| constraint.agent() == agent.id)
        .collect();

    let constraint_limit_time_step = constraints
        .iter()
        .map(|constraint| constraint.time_step())
        .max()
        .unwrap_or(0);
    // Past the last constraint nothing is time dependent any more, so a
    // reachable goal is at most one pass over the grid away.
    let max_time_step = constraint_limit_time_step + map.num_cells();

    // The agent stays on its goal once there, so it may only stop after the
    // last time its goal is forbidden.
    let earliest_goal_time_step = constraints
        .iter()
        .filter_map(|constraint| match **constraint {
            Constraint::Vertex {
                position,
                time_step,
                ..
            } if position == agent.goal => Some(time_step + 1),
            _ => None,
        })
        .max()
        .unwrap_or(0);

    debug!("constraints: {constraints:?}, time bound: {max_time_step:?}, earliest arrival: {earliest_goal_time_step:?}");

    if constraints
        .iter()
        .any(|constraint| constraint.is_violated(agent.id, agent.start, agent.start, 0))
    {
        debug!("start is forbidden at time 0");
        return None;
    }

    let mut open_list = BTreeSet::new();
    let mut discovered = HashSet::new();
    let mut trace = HashMap::new();
    let mut sequence = 0;

    open_list.insert(LowLevelNode {
        position: agent.start,
        f_cost: manhattan_distance(agent.start, agent.goal),
        g_cost: 0,
        sequence,
    });
    discovered.insert((agent.start, 0));

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");
        stats.low_level_expand_nodes += 1;

        if current.position == agent.goal && current.g_cost >= earliest_goal_time_step {
            return Some(construct_path(&trace, (current.position, current.g_cost)));
        }

        if current.g_cost >= max_time_step {
            continue;
        }

        let tentative_g_cost = current.g_cost + 1;

        for neighbor in map.get_neighbors(current.position.0, current.position.1) {
            // Every state has a fixed g cost, the first discovery is kept.
            if discovered.contains(&(neighbor, tentative_g_cost)) {
                continue;
            }

            if constraints.iter().any(|constraint| {
                constraint.is_violated(agent.id, current.position, neighbor, tentative_g_cost)
            }) {
                continue; // This move is prohibited due to a constraint.
            }

            sequence += 1;
            discovered.insert((neighbor, tentative_g_cost));
            trace.insert(
                (neighbor, tentative_g_cost),
                (current.position, current.g_cost),
            );
            open_list.insert(LowLevelNode {
                position: neighbor,
                f_cost: tentative_g_cost + manhattan_distance(neighbor, agent.goal),
                g_cost: tentative_g_cost,
                sequence,
            });
        }
    }

    debug!("cannot find solution");
    None
}
