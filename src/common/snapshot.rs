use crate::domains::agent::AgentKind;
use crate::domains::grid::TilePos;
use crate::domains::location::LocationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serializable picture of a world: terrain, placed locations and where
/// each agent stood. Paths and reservations are not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major walkability, `y * width + x`.
    pub walkable: Vec<bool>,
    pub locations: Vec<LocationRecord>,
    pub agents: Vec<AgentRecord>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub kind: LocationKind,
    pub origin: TilePos,
    pub entrance: TilePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub kind: AgentKind,
    pub tile: TilePos,
}

#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, name: &str, snapshot: &WorldSnapshot) -> Result<(), String>;

    async fn load(&self, name: &str) -> Result<Option<WorldSnapshot>, String>;

    /// Save names, sorted.
    async fn list(&self) -> Result<Vec<String>, String>;
}
