use super::types::{AgentId, AgentKind};
use crate::common::DomainEvent;
use crate::domains::grid::TilePos;
use crate::domains::location::LocationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    Spawned {
        agent_id: AgentId,
        kind: AgentKind,
        tile: TilePos,
        timestamp: DateTime<Utc>,
    },
    PathAssigned {
        agent_id: AgentId,
        goal: TilePos,
        waypoints: usize,
        timestamp: DateTime<Utc>,
    },
    PathNotFound {
        agent_id: AgentId,
        goal: TilePos,
        timestamp: DateTime<Utc>,
    },
    ReservationAcquired {
        agent_id: AgentId,
        location_id: LocationId,
        timestamp: DateTime<Utc>,
    },
    ReservationReleased {
        agent_id: AgentId,
        location_id: LocationId,
        timestamp: DateTime<Utc>,
    },
    VisitStarted {
        agent_id: AgentId,
        location_id: LocationId,
        timestamp: DateTime<Utc>,
    },
    VisitEnded {
        agent_id: AgentId,
        location_id: LocationId,
        timestamp: DateTime<Utc>,
    },
    ExitCommitted {
        agent_id: AgentId,
        exit: TilePos,
        timestamp: DateTime<Utc>,
    },
    Despawned {
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },
}

impl AgentEvent {
    pub fn agent_id(&self) -> AgentId {
        match self {
            AgentEvent::Spawned { agent_id, .. }
            | AgentEvent::PathAssigned { agent_id, .. }
            | AgentEvent::PathNotFound { agent_id, .. }
            | AgentEvent::ReservationAcquired { agent_id, .. }
            | AgentEvent::ReservationReleased { agent_id, .. }
            | AgentEvent::VisitStarted { agent_id, .. }
            | AgentEvent::VisitEnded { agent_id, .. }
            | AgentEvent::ExitCommitted { agent_id, .. }
            | AgentEvent::Despawned { agent_id, .. } => *agent_id,
        }
    }
}

impl DomainEvent for AgentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AgentEvent::Spawned { .. } => "Spawned",
            AgentEvent::PathAssigned { .. } => "PathAssigned",
            AgentEvent::PathNotFound { .. } => "PathNotFound",
            AgentEvent::ReservationAcquired { .. } => "ReservationAcquired",
            AgentEvent::ReservationReleased { .. } => "ReservationReleased",
            AgentEvent::VisitStarted { .. } => "VisitStarted",
            AgentEvent::VisitEnded { .. } => "VisitEnded",
            AgentEvent::ExitCommitted { .. } => "ExitCommitted",
            AgentEvent::Despawned { .. } => "Despawned",
        }
    }

    fn aggregate_id(&self) -> String {
        self.agent_id().to_string()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AgentEvent::Spawned { timestamp, .. }
            | AgentEvent::PathAssigned { timestamp, .. }
            | AgentEvent::PathNotFound { timestamp, .. }
            | AgentEvent::ReservationAcquired { timestamp, .. }
            | AgentEvent::ReservationReleased { timestamp, .. }
            | AgentEvent::VisitStarted { timestamp, .. }
            | AgentEvent::VisitEnded { timestamp, .. }
            | AgentEvent::ExitCommitted { timestamp, .. }
            | AgentEvent::Despawned { timestamp, .. } => *timestamp,
        }
    }
}
