//! A* search over a 4-connected walkability grid.
//!
//! Step cost and heuristic are both Manhattan distance. The open set pops the
//! lowest `f`, breaking ties on the lowest `h`. Expanded nodes are never
//! reopened.

use super::path::Path;
use crate::domains::grid::{GridView, TilePos};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const NO_PARENT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unseen,
    Open,
    Closed,
}

/// Heap key: lowest f first, then lowest h, then lowest index for a stable order.
type OpenEntry = Reverse<(OrderedFloat<f32>, OrderedFloat<f32>, u32)>;

/// Reusable A* engine.
///
/// Node buffers are kept between calls and resized to whichever grid is
/// searched, so an agent that re-plans every few seconds does not allocate a
/// fresh node grid each time. Results are identical to a fresh instance.
#[derive(Debug, Default)]
pub struct PathFinder {
    g_cost: Vec<f32>,
    h_cost: Vec<f32>,
    parent: Vec<u32>,
    state: Vec<NodeState>,
    open: BinaryHeap<OpenEntry>,
    expanded: usize,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes expanded by the most recent search.
    pub fn last_expanded(&self) -> usize {
        self.expanded
    }

    /// Shortest 4-connected walkable path from `start` to `goal`.
    ///
    /// Returns `None` when either end lies outside the grid or the goal is
    /// unreachable. `start == goal` yields an empty path. The start tile
    /// itself does not need to be walkable.
    pub fn find_path<G: GridView + ?Sized>(&mut self, grid: &G, start: TilePos, goal: TilePos) -> Option<Path> {
        self.expanded = 0;
        if !grid.in_bounds(start) || !grid.in_bounds(goal) {
            return None;
        }
        if start == goal {
            return Some(Path::empty());
        }
        if !grid.is_walkable(goal) {
            return None;
        }

        let width = grid.width();
        let cells = width as usize * grid.height() as usize;
        self.reset(cells);

        let index = |tile: TilePos| (tile.y * width + tile.x) as usize;
        let tile_at = |i: usize| TilePos::new(i as i32 % width, i as i32 / width);

        let start_idx = index(start);
        let goal_idx = index(goal);
        let start_h = heuristic(start, goal);
        self.g_cost[start_idx] = 0.0;
        self.h_cost[start_idx] = start_h;
        self.state[start_idx] = NodeState::Open;
        self.open
            .push(Reverse((OrderedFloat(start_h), OrderedFloat(start_h), start_idx as u32)));

        while let Some(Reverse((_, _, current))) = self.open.pop() {
            let current = current as usize;
            // Superseded heap entries for already-closed nodes.
            if self.state[current] == NodeState::Closed {
                continue;
            }
            self.state[current] = NodeState::Closed;
            self.expanded += 1;

            if current == goal_idx {
                return Some(self.retrace(start_idx, goal_idx, tile_at));
            }

            let current_tile = tile_at(current);
            let current_g = self.g_cost[current];
            for neighbor in current_tile.neighbors() {
                if !grid.is_walkable(neighbor) {
                    continue;
                }
                let n = index(neighbor);
                if self.state[n] == NodeState::Closed {
                    continue;
                }
                let tentative = current_g + current_tile.manhattan(&neighbor) as f32;
                if self.state[n] == NodeState::Open && tentative >= self.g_cost[n] {
                    continue;
                }
                let h = heuristic(neighbor, goal);
                self.g_cost[n] = tentative;
                self.h_cost[n] = h;
                self.parent[n] = current as u32;
                self.state[n] = NodeState::Open;
                self.open
                    .push(Reverse((OrderedFloat(tentative + h), OrderedFloat(h), n as u32)));
            }
        }

        None
    }

    fn reset(&mut self, cells: usize) {
        self.g_cost.clear();
        self.g_cost.resize(cells, f32::INFINITY);
        self.h_cost.clear();
        self.h_cost.resize(cells, 0.0);
        self.parent.clear();
        self.parent.resize(cells, NO_PARENT);
        self.state.clear();
        self.state.resize(cells, NodeState::Unseen);
        self.open.clear();
    }

    fn retrace(&self, start_idx: usize, goal_idx: usize, tile_at: impl Fn(usize) -> TilePos) -> Path {
        let mut waypoints = Vec::new();
        let mut current = goal_idx;
        while current != start_idx {
            waypoints.push(tile_at(current));
            let parent = self.parent[current];
            if parent == NO_PARENT {
                break;
            }
            current = parent as usize;
        }
        waypoints.reverse();
        Path::new(waypoints)
    }
}

fn heuristic(from: TilePos, to: TilePos) -> f32 {
    from.manhattan(&to) as f32
}

/// One-shot search with a freshly allocated engine.
pub fn find_path<G: GridView + ?Sized>(grid: &G, start: TilePos, goal: TilePos) -> Option<Path> {
    PathFinder::new().find_path(grid, start, goal)
}
