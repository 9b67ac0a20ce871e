use super::simulation_service::SimulationContext;
use crate::common::{ApplicationResult, DomainError};
use crate::domains::grid::TilePos;
use crate::domains::location::{
    footprint_tiles, HabitatKind, Location, LocationId, LocationKind, ShopKind,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Builds and demolishes structures on the live grid.
///
/// Placements are serialized so a validity check and the cell writes that
/// follow it are never interleaved with another placement.
pub struct PlacementService {
    ctx: SimulationContext,
    lock: Mutex<()>,
}

impl PlacementService {
    pub fn new(ctx: SimulationContext) -> Self {
        Self {
            ctx,
            lock: Mutex::new(()),
        }
    }

    /// Block a single tile.
    pub async fn place_fence(&self, tile: TilePos) -> ApplicationResult<()> {
        let _guard = self.lock.lock().await;
        self.check_in_bounds(tile)?;
        if self.ctx.locations.all().iter().any(|l| l.entrance == tile) {
            return Err(invalid(format!(
                "fence at ({}, {}) would block a location entrance",
                tile.x, tile.y
            )));
        }
        self.ctx.grid.set_walkable(tile, false)?;
        tracing::debug!(x = tile.x, y = tile.y, "fence placed");
        Ok(())
    }

    /// Open a single tile for walking. Location footprints are left alone.
    pub async fn place_road(&self, tile: TilePos) -> ApplicationResult<()> {
        let _guard = self.lock.lock().await;
        self.check_in_bounds(tile)?;
        if self.location_at(tile).is_some() {
            return Err(invalid(format!(
                "road at ({}, {}) overlaps a location",
                tile.x, tile.y
            )));
        }
        self.ctx.grid.set_walkable(tile, true)?;
        tracing::debug!(x = tile.x, y = tile.y, "road placed");
        Ok(())
    }

    /// Demolish whatever occupies `tile`. A location covering the tile is
    /// removed as a whole; anything else becomes walkable.
    pub async fn clear_tile(&self, tile: TilePos) -> ApplicationResult<()> {
        let _guard = self.lock.lock().await;
        self.check_in_bounds(tile)?;
        match self.location_at(tile) {
            Some(location) => self.remove_unlocked(location.id),
            None => {
                self.ctx.grid.set_walkable(tile, true)?;
                Ok(())
            }
        }
    }

    pub async fn place_shop(&self, kind: ShopKind, origin: TilePos) -> ApplicationResult<LocationId> {
        self.place(LocationKind::Shop(kind), origin).await
    }

    pub async fn place_habitat(&self, kind: HabitatKind, origin: TilePos) -> ApplicationResult<LocationId> {
        self.place(LocationKind::Habitat(kind), origin).await
    }

    pub async fn remove_location(&self, id: LocationId) -> ApplicationResult<()> {
        let _guard = self.lock.lock().await;
        self.remove_unlocked(id)
    }

    /// Tile agents walk to when visiting a location placed at `origin`.
    pub fn entrance_for(origin: TilePos) -> TilePos {
        TilePos::new(origin.x, origin.y - 1)
    }

    async fn place(&self, kind: LocationKind, origin: TilePos) -> ApplicationResult<LocationId> {
        let _guard = self.lock.lock().await;
        let params = kind.params();
        let footprint = footprint_tiles(origin, params.footprint);
        let entrance = Self::entrance_for(origin);
        let grid = &self.ctx.grid;

        for tile in &footprint {
            if !grid.in_bounds(*tile) {
                return Err(invalid(format!("{:?} footprint leaves the grid at ({}, {})", kind, tile.x, tile.y)));
            }
            if !grid.is_walkable(*tile) {
                return Err(invalid(format!("{:?} footprint is blocked at ({}, {})", kind, tile.x, tile.y)));
            }
        }
        if !grid.in_bounds(entrance) || !grid.is_walkable(entrance) {
            return Err(invalid(format!(
                "{:?} entrance ({}, {}) is not a free tile",
                kind, entrance.x, entrance.y
            )));
        }

        for tile in &footprint {
            grid.set_walkable(*tile, false)?;
        }
        let location = self
            .ctx
            .locations
            .insert(Location::new(LocationId::new(), kind, origin, entrance));

        tracing::info!(
            location_id = %location.id,
            capacity = location.admission.capacity(),
            "{:?} placed at ({}, {})",
            kind,
            origin.x,
            origin.y
        );
        self.ctx.logger.info(&format!(
            "placed {} for {}",
            params.sprite_key, params.cost
        ));
        Ok(location.id)
    }

    fn remove_unlocked(&self, id: LocationId) -> ApplicationResult<()> {
        let location = self
            .ctx
            .locations
            .remove(id)
            .ok_or_else(|| DomainError::LocationNotFound { id: id.to_string() })?;
        for tile in location.footprint_tiles() {
            self.ctx.grid.set_walkable(tile, true)?;
        }
        tracing::info!(
            location_id = %id,
            occupants = location.admission.occupant_count(),
            "location removed"
        );
        Ok(())
    }

    fn location_at(&self, tile: TilePos) -> Option<Arc<Location>> {
        self.ctx
            .locations
            .all()
            .into_iter()
            .find(|l| l.footprint_tiles().contains(&tile))
    }

    fn check_in_bounds(&self, tile: TilePos) -> ApplicationResult<()> {
        if self.ctx.grid.in_bounds(tile) {
            Ok(())
        } else {
            Err(DomainError::OutOfBounds { x: tile.x, y: tile.y }.into())
        }
    }
}

fn invalid(reason: String) -> crate::common::ApplicationError {
    DomainError::InvalidPlacement { reason }.into()
}
