use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zoo_sim::adapters::inbound::{FileSnapshotStore, InMemoryEventJournal};
use zoo_sim::adapters::outbound::{init_buffered_logger, init_tracing_logger};
use zoo_sim::application::{PlacementService, SimulationContext, SimulationService};
use zoo_sim::common::{EventJournal, SnapshotStore};
use zoo_sim::domains::grid::TilePos;
use zoo_sim::domains::location::{HabitatKind, ShopKind};
use zoo_sim::Config;

const CONFIG_PATH: &str = "config.toml";

fn main() -> anyhow::Result<()> {
    let config = load_config(CONFIG_PATH)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.logging.with_target)
        .init();

    // agent tasks share a bounded worker pool
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.simulation.worker_threads)
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(run(config))
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if !Path::new(path).exists() {
        return Ok(Config::default());
    }
    // read before the main runtime exists, since its size comes from here
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime
        .block_on(Config::from_file(path))
        .with_context(|| format!("failed to load {}", path))
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting zoo simulation");

    let logger = init_buffered_logger(init_tracing_logger(), 1024);
    let snapshots = FileSnapshotStore::new(config.persistence.snapshot_dir.clone());
    let journal = Arc::new(InMemoryEventJournal::with_capacity(
        config.simulation.journal_capacity,
    ));

    let ctx = SimulationContext::from_config(config.clone(), logger);
    let placement = PlacementService::new(ctx.clone());
    build_demo_park(&placement, &config).await;

    let simulation = SimulationService::start(ctx, journal.clone())?;
    for _ in 0..config.agents.initial_visitors {
        simulation.spawn_visitor()?;
    }
    for _ in 0..config.agents.initial_zookeepers {
        simulation.spawn_zookeeper(config.simulation.entrance)?;
    }
    info!(
        visitors = config.agents.initial_visitors,
        zookeepers = config.agents.initial_zookeepers,
        "Zoo open"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down zoo simulation");

    let snapshot = simulation.capture_snapshot();
    if let Err(e) = snapshots.save("autosave", &snapshot).await {
        warn!("autosave failed: {}", e);
    }

    let stats = simulation.shutdown().await;
    info!(
        spawned = stats.spawned,
        despawned = stats.despawned,
        visits = stats.visits,
        path_failures = stats.path_failures,
        journaled = journal.count().await,
        "Simulation stopped"
    );
    Ok(())
}

/// A few habitats and shops along a fenced path, scaled to the grid.
async fn build_demo_park(placement: &PlacementService, config: &Config) {
    let w = config.grid.width;
    let h = config.grid.height;
    let habitats = [
        (HabitatKind::Savanna, TilePos::new(w / 5, h / 4)),
        (HabitatKind::Arctic, TilePos::new(w / 2, h / 4)),
        (HabitatKind::Jungle, TilePos::new(w * 3 / 4, h / 2)),
    ];
    let shops = [
        (ShopKind::FoodStall, TilePos::new(w / 5, h * 3 / 4)),
        (ShopKind::DrinkStand, TilePos::new(w / 2, h * 3 / 4)),
        (ShopKind::GiftShop, TilePos::new(w / 3, h / 2)),
    ];

    for (kind, origin) in habitats {
        if let Err(e) = placement.place_habitat(kind, origin).await {
            warn!("skipping {:?}: {}", kind, e);
        }
    }
    for (kind, origin) in shops {
        if let Err(e) = placement.place_shop(kind, origin).await {
            warn!("skipping {:?}: {}", kind, e);
        }
    }
    for y in (h / 8)..(h * 7 / 8) {
        if let Err(e) = placement.place_fence(TilePos::new(w * 2 / 3, y)).await {
            warn!("fence: {}", e);
        }
    }
}
