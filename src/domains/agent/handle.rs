use super::types::{AgentId, AgentKind, BehaviorState};
use crate::domains::grid::{pixel_to_tile, PixelPos, TilePos};
use crate::domains::path_planning::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared view of one agent.
///
/// The agent's own task is the only writer; render, hit-test and snapshot
/// code read through the locked accessors, so an (x, y) pair is never torn.
#[derive(Debug)]
pub struct AgentHandle {
    id: AgentId,
    kind: AgentKind,
    position: Mutex<PixelPos>,
    path: Mutex<Option<Path>>,
    state: Mutex<BehaviorState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AgentHandle {
    pub fn new(id: AgentId, kind: AgentKind, position: PixelPos) -> Self {
        Self {
            id,
            kind,
            position: Mutex::new(position),
            path: Mutex::new(None),
            state: Mutex::new(BehaviorState::Idle),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn position(&self) -> PixelPos {
        *lock(&self.position)
    }

    pub fn tile(&self, tile_size: f32) -> TilePos {
        pixel_to_tile(self.position(), tile_size)
    }

    /// Route currently being followed, for debug overlays.
    pub fn current_path(&self) -> Option<Path> {
        lock(&self.path).clone()
    }

    pub fn state(&self) -> BehaviorState {
        *lock(&self.state)
    }

    pub(crate) fn set_position(&self, position: PixelPos) {
        *lock(&self.position) = position;
    }

    pub(crate) fn set_path(&self, path: Option<Path>) {
        *lock(&self.path) = path;
    }

    pub(crate) fn set_state(&self, state: BehaviorState) {
        *lock(&self.state) = state;
    }
}
