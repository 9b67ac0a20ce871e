use crate::common::{SnapshotStore, WorldSnapshot};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory snapshot store for tests and development.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    saves: RwLock<BTreeMap<String, WorldSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, name: &str, snapshot: &WorldSnapshot) -> Result<(), String> {
        self.saves
            .write()
            .await
            .insert(name.to_string(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<WorldSnapshot>, String> {
        Ok(self.saves.read().await.get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, String> {
        Ok(self.saves.read().await.keys().cloned().collect())
    }
}
