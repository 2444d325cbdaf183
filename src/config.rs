use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Deserialize;

use crate::scenario::Scenario;
use crate::solver::prioritizer;

#[derive(Parser, Debug)]
#[command(
    name = "CBS MAPF",
    about = "Conflict-Based Search for multi-agent path finding on grids.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Number of grid rows")]
    pub height: Option<usize>,

    #[arg(long, help = "Number of grid columns")]
    pub width: Option<usize>,

    #[arg(long, help = "Probability that a cell is an obstacle")]
    pub obstacle_ratio: Option<f64>,

    #[arg(long, help = "Number of agents")]
    pub num_agents: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(
        long,
        help = "Use the bounded entry point, unsolvable instances are not an error",
        default_value_t = false
    )]
    pub bounded: bool,

    #[arg(long, help = "Collision prioritizer: identity or earliest")]
    pub prioritizer: Option<String>,

    #[arg(long, help = "Stop after this many high level expansions")]
    pub node_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub height: usize,
    pub width: usize,
    pub obstacle_ratio: f64,
    pub num_agents: usize,
    pub seed: u64,
    pub bounded: bool,
    pub prioritizer: String,
    pub node_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            height: 16,
            width: 16,
            obstacle_ratio: 0.1,
            num_agents: 8,
            seed: 0,
            bounded: false,
            prioritizer: "identity".to_string(),
            node_limit: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse config")
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(obstacle_ratio) = cli.obstacle_ratio {
            self.obstacle_ratio = obstacle_ratio;
        }
        if let Some(num_agents) = cli.num_agents {
            self.num_agents = num_agents;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if cli.bounded {
            self.bounded = true;
        }
        if let Some(prioritizer) = &cli.prioritizer {
            self.prioritizer = prioritizer.clone();
        }
        if cli.node_limit.is_some() {
            self.node_limit = cli.node_limit;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(anyhow!(
                "Grid must have at least one cell, got {}x{}",
                self.height,
                self.width
            ));
        }

        if !(0.0..1.0).contains(&self.obstacle_ratio) {
            return Err(anyhow!(
                "Obstacle ratio must be in [0, 1), got {}",
                self.obstacle_ratio
            ));
        }

        if self.num_agents == 0 {
            return Err(anyhow!("Number of agents must be positive"));
        }

        if self.node_limit == Some(0) {
            return Err(anyhow!("Node limit must be positive when set"));
        }

        prioritizer::from_name(&self.prioritizer)?;
        Ok(())
    }

    pub fn scenario(&self) -> Scenario {
        Scenario {
            height: self.height,
            width: self.width,
            obstacle_ratio: self.obstacle_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_from_yaml_str_fills_defaults() {
        let config = Config::from_yaml_str("num_agents: 3\nprioritizer: earliest\n").unwrap();
        assert_eq!(config.num_agents, 3);
        assert_eq!(config.prioritizer, "earliest");
        assert_eq!(config.height, Config::default().height);
        assert!(config.node_limit.is_none());
    }

    #[test]
    fn test_override_from_command_line() {
        let cli = Cli::parse_from([
            "cbs",
            "--num-agents",
            "5",
            "--bounded",
            "--node-limit",
            "100",
        ]);
        let config = Config::default().override_from_command_line(&cli).unwrap();
        assert_eq!(config.num_agents, 5);
        assert!(config.bounded);
        assert_eq!(config.node_limit, Some(100));
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            obstacle_ratio: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            prioritizer: "learned".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let cli = Cli::parse_from(["cbs", "--width", "0"]);
        assert!(Config::default().override_from_command_line(&cli).is_err());
    }
}
