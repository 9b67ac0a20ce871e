use crate::common::{DomainError, DomainResult};
use crate::domains::grid::TilePos;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on `tick_rate_hz`; faster rates round the tick period down to nothing.
pub const MAX_TICK_RATE_HZ: f32 = 1000.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub simulation: SimulationConfig,
    pub agents: AgentsConfig,
    pub logging: LoggingConfig,
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    /// Pixels per tile edge.
    pub tile_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_rate_hz: f32,
    /// Size of the worker pool that runs agent tasks.
    pub worker_threads: usize,
    pub decision_interval_secs: f32,
    pub visit_dwell_secs: f32,
    pub hunger_threshold: f32,
    pub hunger_rate_per_sec: f32,
    pub random_walk_attempts: usize,
    pub max_visitor_stay_secs: f32,
    pub entrance: TilePos,
    pub exit: TilePos,
    pub event_buffer: usize,
    /// Most recent events kept by the in-memory journal.
    pub journal_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Pixels per second.
    pub visitor_speed: f32,
    pub zookeeper_speed: f32,
    pub initial_visitors: usize,
    pub initial_zookeepers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
    pub with_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub snapshot_dir: PathBuf,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            tile_size: 32.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            worker_threads: 4,
            decision_interval_secs: 3.0,
            visit_dwell_secs: 5.0,
            hunger_threshold: 70.0,
            hunger_rate_per_sec: 2.0,
            random_walk_attempts: 16,
            max_visitor_stay_secs: 300.0,
            entrance: TilePos::new(0, 0),
            exit: TilePos::new(0, 0),
            event_buffer: 256,
            journal_capacity: 10_000,
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            visitor_speed: 64.0,
            zookeeper_speed: 80.0,
            initial_visitors: 8,
            initial_zookeepers: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            with_target: false,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("saves"),
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let invalid = |reason: &str| {
            Err(DomainError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.grid.width <= 0 || self.grid.height <= 0 {
            return invalid("grid dimensions must be positive");
        }
        if self.grid.tile_size <= 0.0 {
            return invalid("tile_size must be positive");
        }
        let rate = self.simulation.tick_rate_hz;
        if !(rate > 0.0 && rate <= MAX_TICK_RATE_HZ) {
            return Err(DomainError::InvalidConfig {
                reason: format!("tick_rate_hz must be in (0, {}], got {}", MAX_TICK_RATE_HZ, rate),
            });
        }
        if self.simulation.worker_threads == 0 {
            return invalid("worker_threads must be at least 1");
        }
        if self.simulation.event_buffer == 0 {
            return invalid("event_buffer must be at least 1");
        }
        if self.simulation.journal_capacity == 0 {
            return invalid("journal_capacity must be at least 1");
        }
        if self.agents.visitor_speed <= 0.0 || self.agents.zookeeper_speed <= 0.0 {
            return invalid("agent speeds must be positive");
        }
        for (name, tile) in [("entrance", self.simulation.entrance), ("exit", self.simulation.exit)] {
            if tile.x < 0 || tile.y < 0 || tile.x >= self.grid.width || tile.y >= self.grid.height {
                return Err(DomainError::InvalidConfig {
                    reason: format!("{} tile ({}, {}) is outside the grid", name, tile.x, tile.y),
                });
            }
        }
        Ok(())
    }
}
