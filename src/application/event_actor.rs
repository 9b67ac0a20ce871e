use super::simulation_service::AgentRegistry;
use crate::common::{DomainEvent, EventEnvelope, EventJournal};
use crate::domains::agent::{AgentEvent, AgentKind};
use crate::domains::logger::DynLogger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Running totals over every event the simulation has produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub spawned: u64,
    pub despawned: u64,
    pub visits: u64,
    pub paths_assigned: u64,
    pub path_failures: u64,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> u64 {
        self.spawned.saturating_sub(self.despawned)
    }

    pub fn apply_event(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::Spawned { .. } => self.spawned += 1,
            AgentEvent::Despawned { .. } => self.despawned += 1,
            AgentEvent::VisitEnded { .. } => self.visits += 1,
            AgentEvent::PathAssigned { .. } => self.paths_assigned += 1,
            AgentEvent::PathNotFound { .. } => self.path_failures += 1,
            _ => {}
        }
    }
}

/// Coordinating actor: journals agent events, keeps the stats projection
/// and drops despawned agents from the live registry.
pub struct SimulationEventActor {
    journal: Arc<dyn EventJournal>,
    stats: Arc<RwLock<SimulationStats>>,
    agents: Arc<AgentRegistry>,
    logger: DynLogger,
    event_receiver: mpsc::Receiver<AgentEvent>,
    sequence: u64,
}

impl SimulationEventActor {
    pub fn new(
        journal: Arc<dyn EventJournal>,
        agents: Arc<AgentRegistry>,
        logger: DynLogger,
        event_receiver: mpsc::Receiver<AgentEvent>,
    ) -> Self {
        Self {
            journal,
            stats: Arc::new(RwLock::new(SimulationStats::new())),
            agents,
            logger,
            event_receiver,
            sequence: 0,
        }
    }

    pub fn stats_handle(&self) -> Arc<RwLock<SimulationStats>> {
        Arc::clone(&self.stats)
    }

    /// Drain the channel until every sender is gone.
    pub async fn run(mut self) {
        while let Some(event) = self.event_receiver.recv().await {
            if let Err(e) = self.handle_event(event).await {
                tracing::error!("Failed to handle agent event: {}", e);
            }
        }
        tracing::debug!("simulation event actor finished after {} events", self.sequence);
    }

    async fn handle_event(&mut self, event: AgentEvent) -> Result<(), String> {
        // projections and the registry are updated even if journaling fails
        self.stats.write().await.apply_event(&event);
        self.apply_lifecycle(&event);

        self.sequence += 1;
        let envelope = EventEnvelope::new(&event, self.sequence, "SimulationEventActor")
            .map_err(|e| format!("Failed to create event envelope: {}", e))?;
        self.journal.append(envelope).await?;

        tracing::trace!(agent_id = %event.agent_id(), "handled {}", event.event_type());
        Ok(())
    }

    fn apply_lifecycle(&self, event: &AgentEvent) {
        match event {
            AgentEvent::Spawned { agent_id, kind, tile, .. } => {
                self.logger.info(&format!(
                    "{} {} entered at ({}, {})",
                    kind.label(),
                    agent_id,
                    tile.x,
                    tile.y
                ));
            }
            AgentEvent::Despawned { agent_id, .. } => {
                match self.agents.remove(*agent_id) {
                    Some(handle) if handle.kind() == AgentKind::Visitor => {
                        self.logger.info(&format!("visitor {} left the park", agent_id));
                    }
                    Some(_) => {}
                    None => self
                        .logger
                        .warn(&format!("despawned agent {} was not registered", agent_id)),
                }
            }
            _ => {}
        }
    }
}
