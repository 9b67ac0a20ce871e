use crate::common::{SnapshotStore, WorldSnapshot};
use async_trait::async_trait;
use std::path::PathBuf;

/// Stores each save as `<name>.json` under a base directory.
pub struct FileSnapshotStore {
    base_path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn file_path(&self, name: &str) -> Result<PathBuf, String> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(format!("Invalid save name: {:?}", name));
        }
        Ok(self.base_path.join(format!("{}.json", name)))
    }

    async fn ensure_base_dir(&self) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("Failed to create snapshot directory: {}", e))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, name: &str, snapshot: &WorldSnapshot) -> Result<(), String> {
        let path = self.file_path(name)?;
        self.ensure_base_dir().await?;

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| format!("Failed to serialize snapshot: {}", e))?;

        // temp file first, then rename into place
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| format!("Failed to move {} into place: {}", path.display(), e))?;
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<WorldSnapshot>, String> {
        let path = self.file_path(name)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| format!("Failed to deserialize {}: {}", path.display(), e))
    }

    async fn list(&self) -> Result<Vec<String>, String> {
        let mut dir = match tokio::fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(format!("Failed to read directory: {}", e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read directory entry: {}", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path());
        assert!(store.load("../escape").await.is_err());
        assert!(store.load("").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_save_and_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path().join("never-created"));
        assert_eq!(store.load("nothing").await.unwrap(), None);
        assert!(store.list().await.unwrap().is_empty());
    }
}
