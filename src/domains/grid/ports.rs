use super::coords::TilePos;
use super::grid::GridSnapshot;
use crate::common::DomainResult;

/// Read-only walkability lookup. Anything the path finder can search implements this.
pub trait GridView {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Out-of-bounds tiles are never walkable.
    fn is_walkable(&self, tile: TilePos) -> bool;

    fn in_bounds(&self, tile: TilePos) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width() && tile.y < self.height()
    }
}

/// Port for the shared, mutable walkability map.
/// Placement code writes through it; agents only read snapshots.
pub trait WalkabilityMap: GridView + Send + Sync {
    fn set_walkable(&self, tile: TilePos, walkable: bool) -> DomainResult<()>;
    fn snapshot(&self) -> GridSnapshot;
}
