//! Ordering of a node's collisions before the constraint tree branches on
//! the first one. The tree search only relies on this for guidance.

use crate::common::{CTNode, Collision};

use anyhow::bail;

pub trait CollisionPrioritizer {
    /// Reorders or filters the raw collisions of `node`. The first entry of
    /// the result is the one that gets split.
    fn prioritize(&self, node: &CTNode, collisions: Vec<Collision>) -> Vec<Collision>;
}

/// Keeps detection order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl CollisionPrioritizer for Identity {
    fn prioritize(&self, _node: &CTNode, collisions: Vec<Collision>) -> Vec<Collision> {
        collisions
    }
}

/// Splits the earliest collision first, detection order among equal times.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarliestFirst;

impl CollisionPrioritizer for EarliestFirst {
    fn prioritize(&self, _node: &CTNode, mut collisions: Vec<Collision>) -> Vec<Collision> {
        collisions.sort_by_key(|collision| collision.time_step());
        collisions
    }
}

pub fn from_name(name: &str) -> anyhow::Result<Box<dyn CollisionPrioritizer>> {
    match name {
        "identity" => Ok(Box::new(Identity)),
        "earliest" => Ok(Box::new(EarliestFirst)),
        other => bail!("unknown collision prioritizer {other:?}, expected identity or earliest"),
    }
}
