use super::agent_actor::AgentActor;
use super::event_actor::{SimulationEventActor, SimulationStats};
use crate::common::{
    AgentRecord, ApplicationResult, DomainError, EventJournal, LocationRecord, WorldSnapshot,
};
use crate::config::Config;
use crate::domains::agent::{AgentBrain, AgentEvent, AgentHandle, AgentId, AgentKind, BrainSettings};
use crate::domains::grid::{tile_to_pixel, Grid, GridView, TilePos, WalkabilityMap};
use crate::domains::location::{Location, LocationId, LocationRegistry};
use crate::domains::logger::DynLogger;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Live agents, keyed by id. Readers (rendering, hit-testing, snapshots)
/// take cheap clones of the handles.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<AgentId, Arc<AgentHandle>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: Arc<AgentHandle>) {
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.id(), handle);
    }

    pub fn remove(&self, id: AgentId) -> Option<Arc<AgentHandle>> {
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<Arc<AgentHandle>> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Arc<AgentHandle>> {
        let mut all: Vec<Arc<AgentHandle>> = self
            .agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|a| a.id());
        all
    }

    pub fn count_of(&self, kind: AgentKind) -> usize {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|a| a.kind() == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.agents.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the running simulation shares, passed down explicitly.
#[derive(Clone)]
pub struct SimulationContext {
    pub config: Arc<Config>,
    pub grid: Arc<dyn WalkabilityMap>,
    pub locations: Arc<LocationRegistry>,
    pub agents: Arc<AgentRegistry>,
    pub logger: DynLogger,
}

impl SimulationContext {
    pub fn new(config: Config, grid: Arc<dyn WalkabilityMap>, logger: DynLogger) -> Self {
        Self {
            config: Arc::new(config),
            grid,
            locations: Arc::new(LocationRegistry::new()),
            agents: Arc::new(AgentRegistry::new()),
            logger,
        }
    }

    /// Fresh, fully walkable world sized from `[grid]`.
    pub fn from_config(config: Config, logger: DynLogger) -> Self {
        let grid = Arc::new(Grid::new(config.grid.width, config.grid.height));
        Self::new(config, grid, logger)
    }
}

/// Owns the agent tasks and the event actor of one running world.
pub struct SimulationService {
    ctx: SimulationContext,
    event_sender: mpsc::Sender<AgentEvent>,
    shutdown: watch::Sender<bool>,
    agent_tasks: Mutex<Vec<JoinHandle<()>>>,
    event_task: JoinHandle<()>,
    stats: Arc<tokio::sync::RwLock<SimulationStats>>,
}

impl SimulationService {
    /// Validate the config and start the event actor. Must be called inside
    /// a tokio runtime.
    pub fn start(ctx: SimulationContext, journal: Arc<dyn EventJournal>) -> ApplicationResult<Self> {
        ctx.config.validate()?;
        let (event_sender, event_receiver) = mpsc::channel(ctx.config.simulation.event_buffer.max(1));
        let (shutdown, _) = watch::channel(false);

        let actor = SimulationEventActor::new(
            journal,
            Arc::clone(&ctx.agents),
            Arc::clone(&ctx.logger),
            event_receiver,
        );
        let stats = actor.stats_handle();
        let event_task = tokio::spawn(actor.run());

        tracing::info!(
            width = ctx.grid.width(),
            height = ctx.grid.height(),
            "simulation started"
        );

        Ok(Self {
            ctx,
            event_sender,
            shutdown,
            agent_tasks: Mutex::new(Vec::new()),
            event_task,
            stats,
        })
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    /// Spawn a visitor at the park entrance.
    pub fn spawn_visitor(&self) -> ApplicationResult<AgentId> {
        self.spawn_agent(AgentKind::Visitor, self.ctx.config.simulation.entrance)
    }

    pub fn spawn_zookeeper(&self, tile: TilePos) -> ApplicationResult<AgentId> {
        self.spawn_agent(AgentKind::Zookeeper, tile)
    }

    pub fn spawn_agent(&self, kind: AgentKind, tile: TilePos) -> ApplicationResult<AgentId> {
        if !self.ctx.grid.in_bounds(tile) {
            return Err(DomainError::OutOfBounds { x: tile.x, y: tile.y }.into());
        }

        let config = &self.ctx.config;
        let id = AgentId::new();
        let settings = BrainSettings::from_config(config, kind);
        let handle = Arc::new(AgentHandle::new(
            id,
            kind,
            tile_to_pixel(tile, settings.tile_size),
        ));
        self.ctx.agents.insert(Arc::clone(&handle));

        let actor = AgentActor::new(
            AgentBrain::new(id, kind, settings),
            handle,
            Arc::clone(&self.ctx.grid),
            Arc::clone(&self.ctx.locations),
            self.event_sender.clone(),
            self.shutdown.subscribe(),
            Duration::from_secs_f32(1.0 / config.simulation.tick_rate_hz),
        );

        let mut tasks = self.agent_tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(tokio::spawn(actor.run()));

        tracing::debug!(agent_id = %id, kind = kind.label(), x = tile.x, y = tile.y, "agent spawned");
        Ok(id)
    }

    pub fn active_agents(&self) -> usize {
        self.ctx.agents.len()
    }

    pub async fn stats(&self) -> SimulationStats {
        self.stats.read().await.clone()
    }

    /// Terrain, locations and agent tiles as they are right now.
    pub fn capture_snapshot(&self) -> WorldSnapshot {
        let grid = self.ctx.grid.snapshot();
        let tile_size = self.ctx.config.grid.tile_size;
        WorldSnapshot {
            width: grid.width(),
            height: grid.height(),
            walkable: grid.cells().to_vec(),
            locations: self
                .ctx
                .locations
                .all()
                .iter()
                .map(|l| LocationRecord {
                    kind: l.kind,
                    origin: l.origin,
                    entrance: l.entrance,
                })
                .collect(),
            agents: self
                .ctx
                .agents
                .all()
                .iter()
                .map(|a| AgentRecord {
                    kind: a.kind(),
                    tile: a.tile(tile_size),
                })
                .collect(),
            captured_at: Utc::now(),
        }
    }

    /// Build a new running world from a snapshot. Locations start with
    /// empty admissions and every agent starts over at its recorded tile.
    pub fn restore_snapshot(
        snapshot: &WorldSnapshot,
        config: Config,
        logger: DynLogger,
        journal: Arc<dyn EventJournal>,
    ) -> ApplicationResult<Self> {
        let grid = Grid::from_cells(snapshot.width, snapshot.height, &snapshot.walkable)?;
        let mut config = config;
        config.grid.width = snapshot.width;
        config.grid.height = snapshot.height;

        let ctx = SimulationContext::new(config, Arc::new(grid), logger);
        for record in &snapshot.locations {
            if !ctx.grid.in_bounds(record.entrance) {
                return Err(DomainError::OutOfBounds {
                    x: record.entrance.x,
                    y: record.entrance.y,
                }
                .into());
            }
            ctx.locations.insert(Location::new(
                LocationId::new(),
                record.kind,
                record.origin,
                record.entrance,
            ));
        }

        let service = Self::start(ctx, journal)?;
        for agent in &snapshot.agents {
            service.spawn_agent(agent.kind, agent.tile)?;
        }
        service.ctx.logger.info(&format!(
            "restored {} locations and {} agents",
            snapshot.locations.len(),
            snapshot.agents.len()
        ));
        Ok(service)
    }

    /// Stop every agent, wait for them and for the event actor to drain.
    pub async fn shutdown(self) -> SimulationStats {
        let Self {
            ctx,
            event_sender,
            shutdown,
            agent_tasks,
            event_task,
            stats,
        } = self;

        shutdown.send_replace(true);
        let tasks = std::mem::take(&mut *agent_tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("agent task ended abnormally: {}", e);
            }
        }

        drop(event_sender);
        if let Err(e) = event_task.await {
            tracing::warn!("event actor ended abnormally: {}", e);
        }

        let stats = stats.read().await.clone();
        ctx.logger.info(&format!(
            "simulation stopped: {} spawned, {} despawned, {} visits",
            stats.spawned, stats.despawned, stats.visits
        ));
        stats
    }
}
