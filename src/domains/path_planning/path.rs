use crate::domains::grid::TilePos;
use std::sync::Arc;

/// Ordered tile waypoints from (excluding) the start to (including) the goal.
///
/// Immutable and cheap to clone, so the owning agent and any debug overlay
/// can hold the same route without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    waypoints: Arc<[TilePos]>,
}

impl Path {
    pub fn new(waypoints: Vec<TilePos>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }

    /// The "already there" path.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TilePos> {
        self.waypoints.get(index).copied()
    }

    pub fn waypoints(&self) -> &[TilePos] {
        &self.waypoints
    }

    pub fn goal(&self) -> Option<TilePos> {
        self.waypoints.last().copied()
    }
}
