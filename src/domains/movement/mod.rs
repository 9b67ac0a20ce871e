//! Incremental path following under a per-tick distance budget.

use crate::domains::grid::{tile_to_pixel, PixelPos};
use crate::domains::path_planning::Path;

/// Outcome of one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub position: PixelPos,
    pub waypoint_index: usize,
    /// The final waypoint was reached during (or before) this step.
    pub arrived: bool,
}

/// Moves a pixel position along tile waypoints at a fixed speed.
#[derive(Debug, Clone, Copy)]
pub struct MovementController {
    tile_size: f32,
}

impl MovementController {
    pub fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    /// Spend `speed * elapsed` pixels of travel along `path` starting at
    /// `waypoint_index`.
    ///
    /// Waypoints are reached exactly (snapped) and several may be crossed in
    /// one call. Budget left over after the last waypoint is discarded.
    pub fn advance(
        &self,
        path: &Path,
        waypoint_index: usize,
        position: PixelPos,
        speed: f32,
        elapsed: f32,
    ) -> Advance {
        let mut budget = (speed * elapsed).max(0.0);
        let mut position = position;
        let mut index = waypoint_index.min(path.len());

        while let Some(tile) = path.get(index) {
            let target = tile_to_pixel(tile, self.tile_size);
            let distance = position.distance(&target);

            if distance <= budget {
                position = target;
                budget -= distance;
                index += 1;
                continue;
            }

            if budget > 0.0 {
                position.x += (target.x - position.x) / distance * budget;
                position.y += (target.y - position.y) / distance * budget;
            }
            break;
        }

        Advance {
            position,
            waypoint_index: index,
            arrived: index >= path.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::grid::TilePos;

    fn straight_path() -> Path {
        Path::new(vec![TilePos::new(1, 0), TilePos::new(2, 0), TilePos::new(3, 0)])
    }

    #[test]
    fn test_large_budget_crosses_every_waypoint_and_discards_rest() {
        let controller = MovementController::new(32.0);
        let start = tile_to_pixel(TilePos::new(0, 0), 32.0);
        let step = controller.advance(&straight_path(), 0, start, 100.0, 1.0);
        assert_eq!(step.waypoint_index, 3);
        assert!(step.arrived);
        assert_eq!(step.position, PixelPos::new(112.0, 16.0));
    }

    #[test]
    fn test_partial_step_moves_toward_next_waypoint() {
        let controller = MovementController::new(32.0);
        let start = tile_to_pixel(TilePos::new(0, 0), 32.0);
        let step = controller.advance(&straight_path(), 0, start, 50.0, 1.0);
        assert_eq!(step.waypoint_index, 1);
        assert!(!step.arrived);
        assert!((step.position.x - 66.0).abs() < 1e-4);
        assert_eq!(step.position.y, 16.0);
    }

    #[test]
    fn test_exact_budget_snaps_to_waypoint() {
        let controller = MovementController::new(32.0);
        let start = tile_to_pixel(TilePos::new(0, 0), 32.0);
        let step = controller.advance(&straight_path(), 0, start, 64.0, 1.0);
        assert_eq!(step.waypoint_index, 2);
        assert_eq!(step.position, PixelPos::new(80.0, 16.0));
    }

    #[test]
    fn test_many_small_ticks_land_exactly_on_goal() {
        let controller = MovementController::new(32.0);
        let path = straight_path();
        let mut position = tile_to_pixel(TilePos::new(0, 0), 32.0);
        let mut index = 0;
        let mut ticks = 0;
        loop {
            let step = controller.advance(&path, index, position, 100.0, 1.0 / 60.0);
            position = step.position;
            index = step.waypoint_index;
            ticks += 1;
            if step.arrived {
                break;
            }
            assert!(ticks < 1000);
        }
        assert_eq!(position, PixelPos::new(112.0, 16.0));
        assert_eq!(index, path.len());
    }

    #[test]
    fn test_already_on_waypoint_advances_without_nan() {
        let controller = MovementController::new(32.0);
        let path = Path::new(vec![TilePos::new(0, 0), TilePos::new(0, 1)]);
        let start = tile_to_pixel(TilePos::new(0, 0), 32.0);
        let step = controller.advance(&path, 0, start, 0.0, 1.0);
        assert_eq!(step.waypoint_index, 1);
        assert!(!step.position.x.is_nan());
        assert_eq!(step.position, start);
    }

    #[test]
    fn test_exhausted_or_empty_path_is_arrived() {
        let controller = MovementController::new(32.0);
        let here = PixelPos::new(5.0, 5.0);
        let step = controller.advance(&Path::empty(), 0, here, 100.0, 1.0);
        assert!(step.arrived);
        assert_eq!(step.position, here);

        let step = controller.advance(&straight_path(), 7, here, 100.0, 1.0);
        assert_eq!(step.waypoint_index, 3);
        assert!(step.arrived);
    }

    #[test]
    fn test_diagonal_offset_is_normalised() {
        let controller = MovementController::new(10.0);
        let path = Path::new(vec![TilePos::new(3, 4)]);
        // centre of (0,0) is (5,5); target (35,45): distance 50
        let step = controller.advance(&path, 0, PixelPos::new(5.0, 5.0), 10.0, 1.0);
        assert!((step.position.x - 11.0).abs() < 1e-4);
        assert!((step.position.y - 13.0).abs() < 1e-4);
    }
}
