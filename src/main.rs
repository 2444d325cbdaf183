use cbs_mapf::config::{Cli, Config};
use cbs_mapf::solver::{prioritizer, Solver, CBS};
use cbs_mapf::stat::SolveSummary;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let instance = config.scenario().generate_instance(config.num_agents, &mut rng)?;

    let mut solver =
        CBS::new(&instance).with_prioritizer(prioritizer::from_name(&config.prioritizer)?);
    if let Some(limit) = config.node_limit {
        solver = solver.with_node_limit(limit);
    }

    if config.bounded {
        let mut counter = 0;
        match solver.safe_solve(&mut counter) {
            Some(node) => {
                let summary = SolveSummary::new(&node, counter);
                println!("{}", serde_json::to_string(&summary)?);
            }
            None => info!("instance skipped after {counter} replans, no solution found"),
        }
    } else {
        match solver.solve() {
            Ok(solution) => {
                assert!(solution.verify(&instance.map, &instance.agents));
                let stats = solver.stats();
                let summary = SolveSummary {
                    cost: solution.cost(),
                    paths: solution.paths,
                    replan_attempts: stats.replan_attempts,
                    num_constraints: stats.constraints,
                };
                println!("{}", serde_json::to_string(&summary)?);
            }
            Err(err) => error!("cbs solve fails: {err}"),
        }
    }

    Ok(())
}
