use zoo_sim::adapters::outbound::init_noop_logger;
use zoo_sim::application::{PlacementService, SimulationContext};
use zoo_sim::common::{ApplicationError, DomainError};
use zoo_sim::domains::grid::TilePos;
use zoo_sim::domains::location::{HabitatKind, ShopKind};
use zoo_sim::Config;

fn setup() -> (SimulationContext, PlacementService) {
    let mut config = Config::default();
    config.grid.width = 20;
    config.grid.height = 20;
    let ctx = SimulationContext::from_config(config, init_noop_logger());
    let placement = PlacementService::new(ctx.clone());
    (ctx, placement)
}

fn is_invalid_placement<T: std::fmt::Debug>(result: Result<T, ApplicationError>) -> bool {
    matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidPlacement { .. }))
    )
}

#[tokio::test]
async fn test_habitat_blocks_footprint_and_opens_entrance() {
    let (ctx, placement) = setup();
    let id = placement
        .place_habitat(HabitatKind::Savanna, TilePos::new(2, 2))
        .await
        .unwrap();

    let habitat = ctx.locations.get(id).unwrap();
    assert_eq!(habitat.entrance, TilePos::new(2, 1));
    assert_eq!(habitat.admission.capacity(), 3);
    for tile in habitat.footprint_tiles() {
        assert!(!ctx.grid.is_walkable(tile), "{:?} should be blocked", tile);
    }
    assert_eq!(habitat.footprint_tiles().len(), 12);
    assert!(ctx.grid.is_walkable(habitat.entrance));
    assert!(ctx.grid.is_walkable(TilePos::new(6, 2)));
}

#[tokio::test]
async fn test_overlapping_or_out_of_bounds_placement_fails() {
    let (ctx, placement) = setup();
    placement
        .place_habitat(HabitatKind::Arctic, TilePos::new(5, 5))
        .await
        .unwrap();

    assert!(is_invalid_placement(
        placement.place_shop(ShopKind::FoodStall, TilePos::new(6, 6)).await
    ));
    assert!(is_invalid_placement(
        placement.place_habitat(HabitatKind::Jungle, TilePos::new(18, 5)).await
    ));
    // entrance would be at y = -1
    assert!(is_invalid_placement(
        placement.place_shop(ShopKind::DrinkStand, TilePos::new(0, 0)).await
    ));
    assert_eq!(ctx.locations.len(), 1);
    assert!(ctx.grid.is_walkable(TilePos::new(18, 5)));
}

#[tokio::test]
async fn test_blocked_entrance_rejects_placement() {
    let (ctx, placement) = setup();
    placement.place_fence(TilePos::new(3, 3)).await.unwrap();
    assert!(is_invalid_placement(
        placement.place_shop(ShopKind::GiftShop, TilePos::new(3, 4)).await
    ));
    assert!(ctx.locations.is_empty());
}

#[tokio::test]
async fn test_remove_location_unblocks_footprint() {
    let (ctx, placement) = setup();
    let id = placement
        .place_shop(ShopKind::GiftShop, TilePos::new(8, 8))
        .await
        .unwrap();
    assert!(!ctx.grid.is_walkable(TilePos::new(9, 8)));

    placement.remove_location(id).await.unwrap();
    assert!(ctx.grid.is_walkable(TilePos::new(8, 8)));
    assert!(ctx.grid.is_walkable(TilePos::new(9, 8)));
    assert!(ctx.locations.get(id).is_none());

    assert!(matches!(
        placement.remove_location(id).await,
        Err(ApplicationError::Domain(DomainError::LocationNotFound { .. }))
    ));
}

#[tokio::test]
async fn test_fence_road_and_clear() {
    let (ctx, placement) = setup();
    let tile = TilePos::new(10, 10);

    placement.place_fence(tile).await.unwrap();
    assert!(!ctx.grid.is_walkable(tile));
    placement.place_road(tile).await.unwrap();
    assert!(ctx.grid.is_walkable(tile));
    placement.place_fence(tile).await.unwrap();
    placement.clear_tile(tile).await.unwrap();
    assert!(ctx.grid.is_walkable(tile));

    assert!(matches!(
        placement.place_fence(TilePos::new(20, 0)).await,
        Err(ApplicationError::Domain(DomainError::OutOfBounds { x: 20, y: 0 }))
    ));
    assert_eq!(ctx.grid.snapshot().cells().iter().filter(|w| !**w).count(), 0);
}

#[tokio::test]
async fn test_structures_protect_locations() {
    let (ctx, placement) = setup();
    let id = placement
        .place_shop(ShopKind::FoodStall, TilePos::new(4, 4))
        .await
        .unwrap();

    assert!(is_invalid_placement(placement.place_fence(TilePos::new(4, 3)).await));
    assert!(is_invalid_placement(placement.place_road(TilePos::new(4, 4)).await));

    placement.clear_tile(TilePos::new(4, 4)).await.unwrap();
    assert!(ctx.locations.get(id).is_none());
    assert!(ctx.grid.is_walkable(TilePos::new(4, 4)));
}
