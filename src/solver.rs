mod cbs;
pub mod prioritizer;

pub use cbs::CBS;
pub use prioritizer::{CollisionPrioritizer, EarliestFirst, Identity};

use crate::common::Solution;
use crate::error::SolveError;

pub trait Solver {
    fn solve(&mut self) -> Result<Solution, SolveError>;
}
