use super::catalog::LocationKind;
use crate::domains::admission::ResourceAdmission;
use crate::domains::grid::TilePos;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub Uuid);

impl LocationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A placed habitat or shop.
#[derive(Debug)]
pub struct Location {
    pub id: LocationId,
    pub kind: LocationKind,
    /// Bottom-left tile of the footprint.
    pub origin: TilePos,
    /// Walkable tile agents path to when visiting.
    pub entrance: TilePos,
    pub admission: Arc<ResourceAdmission>,
}

impl Location {
    pub fn new(id: LocationId, kind: LocationKind, origin: TilePos, entrance: TilePos) -> Self {
        Self {
            id,
            kind,
            origin,
            entrance,
            admission: Arc::new(ResourceAdmission::new(kind.params().capacity)),
        }
    }

    pub fn footprint_tiles(&self) -> Vec<TilePos> {
        footprint_tiles(self.origin, self.kind.params().footprint)
    }
}

pub fn footprint_tiles(origin: TilePos, (width, height): (i32, i32)) -> Vec<TilePos> {
    (0..height)
        .flat_map(|dy| (0..width).map(move |dx| TilePos::new(origin.x + dx, origin.y + dy)))
        .collect()
}

/// All live habitats and shops, keyed by id.
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: RwLock<HashMap<LocationId, Arc<Location>>>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: Location) -> Arc<Location> {
        let location = Arc::new(location);
        self.locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.id, Arc::clone(&location));
        location
    }

    pub fn remove(&self, id: LocationId) -> Option<Arc<Location>> {
        self.locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn get(&self, id: LocationId) -> Option<Arc<Location>> {
        self.locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Arc<Location>> {
        let mut all: Vec<Arc<Location>> = self
            .locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        // HashMap order is arbitrary; keep callers deterministic for a fixed set.
        all.sort_by_key(|l| l.id);
        all
    }

    pub fn habitats(&self) -> Vec<Arc<Location>> {
        self.all().into_iter().filter(|l| l.kind.is_habitat()).collect()
    }

    pub fn shops(&self) -> Vec<Arc<Location>> {
        self.all().into_iter().filter(|l| l.kind.is_shop()).collect()
    }

    pub fn len(&self) -> usize {
        self.locations.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
