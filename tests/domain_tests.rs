use std::sync::Arc;

use zoo_sim::domains::admission::ResourceAdmission;
use zoo_sim::domains::agent::AgentId;
use zoo_sim::domains::grid::{tile_to_pixel, Grid, GridView, TilePos, WalkabilityMap};
use zoo_sim::domains::movement::MovementController;
use zoo_sim::domains::path_planning::{find_path, PathFinder};

fn is_valid_path(grid: &impl GridView, start: TilePos, path: &[TilePos]) -> bool {
    let mut prev = start;
    for tile in path {
        if prev.manhattan(tile) != 1 || !grid.is_walkable(*tile) {
            return false;
        }
        prev = *tile;
    }
    true
}

#[tokio::test]
async fn test_admission_bound_under_concurrent_tasks() {
    let admission = Arc::new(ResourceAdmission::new(3));
    let mut handles = Vec::new();

    for _ in 0..32 {
        let admission = Arc::clone(&admission);
        handles.push(tokio::spawn(async move {
            let agent = AgentId::new();
            let mut admitted = 0;
            for _ in 0..50 {
                if let Some(reservation) = admission.try_reserve(agent) {
                    assert!(admission.occupant_count() <= admission.capacity());
                    admitted += 1;
                    tokio::task::yield_now().await;
                    drop(reservation);
                }
                tokio::task::yield_now().await;
            }
            admitted
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert!(total > 0);
    assert_eq!(admission.occupant_count(), 0);
    assert_eq!(admission.available(), 3);
}

#[test]
fn test_searches_on_snapshots_while_grid_mutates() {
    let grid = Arc::new(Grid::new(40, 40));

    std::thread::scope(|scope| {
        let writer = Arc::clone(&grid);
        scope.spawn(move || {
            for round in 0..200 {
                let x = 1 + round % 38;
                for y in 5..35 {
                    writer.set_walkable(TilePos::new(x, y), round % 2 == 1).unwrap();
                }
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&grid);
            scope.spawn(move || {
                let mut finder = PathFinder::new();
                for i in 0..50 {
                    let snapshot = reader.snapshot();
                    let start = TilePos::new(0, i % 40);
                    let goal = TilePos::new(39, (i * 7) % 40);
                    if let Some(path) = finder.find_path(&snapshot, start, goal) {
                        assert!(is_valid_path(&snapshot, start, path.waypoints()));
                        assert_eq!(path.goal(), Some(goal));
                    }
                }
            });
        }
    });
}

#[test]
fn test_path_then_movement_reaches_goal() {
    let grid = Grid::new(10, 10);
    for y in 0..9 {
        grid.set_walkable(TilePos::new(5, y), false).unwrap();
    }
    let start = TilePos::new(0, 0);
    let goal = TilePos::new(9, 0);
    let path = find_path(&grid.snapshot(), start, goal).unwrap();
    assert_eq!(path.len(), 9 + 2 * 9);
    assert!(is_valid_path(&grid, start, path.waypoints()));

    let movement = MovementController::new(32.0);
    let mut position = tile_to_pixel(start, 32.0);
    let mut index = 0;
    let mut ticks = 0;
    loop {
        let step = movement.advance(&path, index, position, 96.0, 1.0 / 60.0);
        position = step.position;
        index = step.waypoint_index;
        ticks += 1;
        if step.arrived {
            break;
        }
        assert!(ticks < 10_000);
    }
    assert_eq!(position, tile_to_pixel(goal, 32.0));
}
