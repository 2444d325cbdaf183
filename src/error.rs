use crate::common::CTNode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("no solution exists: agent {agent} cannot reach its goal")]
    UnsolvableFromRoot { agent: usize },

    #[error("no solution exists: constraint tree exhausted after {expanded} expansions")]
    UnsolvableAfterBranching { expanded: usize },

    #[error("node limit of {limit} expansions reached before a solution was found")]
    NodeLimitReached { limit: usize, best: Box<CTNode> },
}

impl SolveError {
    /// Both flavours of "this instance has no conflict-free joint plan".
    pub fn is_unsolvable(&self) -> bool {
        matches!(
            self,
            SolveError::UnsolvableFromRoot { .. } | SolveError::UnsolvableAfterBranching { .. }
        )
    }
}
