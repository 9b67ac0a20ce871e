use super::coords::TilePos;
use super::ports::{GridView, WalkabilityMap};
use crate::common::{DomainError, DomainResult};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Live walkability grid shared by every agent.
///
/// Each cell is an independent atomic so readers never observe a torn cell,
/// but a search running concurrently with placement may see a mix of old and
/// new cells. Agents search against [`GridSnapshot`]s and accept that a path
/// can go stale after it was computed.
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<AtomicBool>,
}

impl Grid {
    /// Fully walkable grid.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = (0..(width as usize * height as usize))
            .map(|_| AtomicBool::new(true))
            .collect();
        Self { width, height, cells }
    }

    /// Rebuild a grid from a row-major walkability array.
    pub fn from_cells(width: i32, height: i32, walkable: &[bool]) -> DomainResult<Self> {
        if width <= 0 || height <= 0 || walkable.len() != width as usize * height as usize {
            return Err(DomainError::InvalidConfig {
                reason: format!(
                    "walkability array of {} cells does not match a {}x{} grid",
                    walkable.len(),
                    width,
                    height
                ),
            });
        }
        let cells = walkable.iter().map(|w| AtomicBool::new(*w)).collect();
        Ok(Self { width, height, cells })
    }

    fn index(&self, tile: TilePos) -> Option<usize> {
        if self.in_bounds(tile) {
            Some((tile.y * self.width + tile.x) as usize)
        } else {
            None
        }
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.load(Ordering::Acquire)).count()
    }
}

impl GridView for Grid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_walkable(&self, tile: TilePos) -> bool {
        self.index(tile)
            .map(|i| self.cells[i].load(Ordering::Acquire))
            .unwrap_or(false)
    }
}

impl WalkabilityMap for Grid {
    fn set_walkable(&self, tile: TilePos, walkable: bool) -> DomainResult<()> {
        let i = self
            .index(tile)
            .ok_or(DomainError::OutOfBounds { x: tile.x, y: tile.y })?;
        self.cells[i].store(walkable, Ordering::Release);
        Ok(())
    }

    fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(|c| c.load(Ordering::Acquire)).collect(),
        }
    }
}

/// Immutable copy of the grid taken at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    width: i32,
    height: i32,
    cells: Arc<[bool]>,
}

impl GridSnapshot {
    /// Row-major walkability flags.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Pick a random walkable tile, giving up after `attempts` draws.
    pub fn random_walkable_tile<R: Rng + ?Sized>(&self, rng: &mut R, attempts: usize) -> Option<TilePos> {
        if self.width <= 0 || self.height <= 0 {
            return None;
        }
        (0..attempts)
            .map(|_| TilePos::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height)))
            .find(|tile| self.is_walkable(*tile))
    }
}

impl GridView for GridSnapshot {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_walkable(&self, tile: TilePos) -> bool {
        if !self.in_bounds(tile) {
            return false;
        }
        self.cells[(tile.y * self.width + tile.x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_grid_is_walkable() {
        let grid = Grid::new(10, 5);
        assert_eq!(grid.walkable_count(), 50);
        assert!(grid.is_walkable(TilePos::new(9, 4)));
    }

    #[test]
    fn test_out_of_bounds_is_not_walkable() {
        let grid = Grid::new(10, 10);
        assert!(!grid.is_walkable(TilePos::new(-1, 0)));
        assert!(!grid.is_walkable(TilePos::new(0, 10)));
        assert!(!grid.is_walkable(TilePos::new(10, 3)));
    }

    #[test]
    fn test_set_walkable_out_of_bounds_reports_and_leaves_cells() {
        let grid = Grid::new(4, 4);
        let result = grid.set_walkable(TilePos::new(4, 0), false);
        assert!(matches!(result, Err(DomainError::OutOfBounds { x: 4, y: 0 })));
        // would alias (0, 1) with a naive row-major index
        assert!(grid.is_walkable(TilePos::new(0, 1)));
        assert_eq!(grid.walkable_count(), 16);
    }

    #[test]
    fn test_last_write_wins() {
        let grid = Grid::new(3, 3);
        let tile = TilePos::new(1, 1);
        grid.set_walkable(tile, false).unwrap();
        assert!(!grid.is_walkable(tile));
        grid.set_walkable(tile, true).unwrap();
        assert!(grid.is_walkable(tile));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let grid = Grid::new(3, 3);
        let snapshot = grid.snapshot();
        grid.set_walkable(TilePos::new(2, 2), false).unwrap();
        assert!(snapshot.is_walkable(TilePos::new(2, 2)));
        assert!(!grid.snapshot().is_walkable(TilePos::new(2, 2)));
    }

    #[test]
    fn test_from_cells_rejects_wrong_length() {
        assert!(Grid::from_cells(2, 2, &[true; 3]).is_err());
        let grid = Grid::from_cells(2, 2, &[true, false, true, true]).unwrap();
        assert!(!grid.is_walkable(TilePos::new(1, 0)));
    }

    #[test]
    fn test_random_walkable_tile() {
        let grid = Grid::new(5, 5);
        for x in 0..5 {
            for y in 0..5 {
                if (x, y) != (2, 3) {
                    grid.set_walkable(TilePos::new(x, y), false).unwrap();
                }
            }
        }
        let snapshot = grid.snapshot();
        let mut rng = StdRng::seed_from_u64(7);
        let found = snapshot.random_walkable_tile(&mut rng, 10_000);
        assert_eq!(found, Some(TilePos::new(2, 3)));

        let blocked = Grid::from_cells(1, 1, &[false]).unwrap().snapshot();
        assert_eq!(blocked.random_walkable_tile(&mut rng, 50), None);
    }
}
