// ─── Filesystem Store ───
// One JSON file per manifest record, named by the record's cache key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::assets::model::StoredManifest;
use crate::catalog::model::Edition;
use crate::error::{ToolsError, ToolsResult};
use crate::store::{cache_key, ManifestStore};

pub struct FsManifestStore {
    root: PathBuf,
}

impl FsManifestStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `<platform data dir>/packlab/manifests`
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("packlab")
            .join("manifests")
    }

    fn record_path(&self, name: &str, edition: Edition, schema_version: i32) -> PathBuf {
        self.root
            .join(format!("{}.json", cache_key(name, edition, schema_version)))
    }

    async fn read_record(path: &Path) -> ToolsResult<Option<StoredManifest>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ToolsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

#[async_trait]
impl ManifestStore for FsManifestStore {
    async fn insert(&self, record: StoredManifest) -> ToolsResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ToolsError::Io {
                path: self.root.clone(),
                source,
            })?;

        let path = self.record_path(&record.name, record.edition, record.version);
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ToolsError::Io { path, source })
    }

    async fn find(
        &self,
        name: &str,
        edition: Edition,
        schema_version: i32,
    ) -> ToolsResult<Option<StoredManifest>> {
        Self::read_record(&self.record_path(name, edition, schema_version)).await
    }

    async fn find_all(&self) -> ToolsResult<Vec<StoredManifest>> {
        let mut records = Vec::new();

        if !self.root.exists() {
            return Ok(records);
        }

        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|source| ToolsError::Io {
                path: self.root.clone(),
                source,
            })?;

        while let Some(entry) = entries.next_entry().await.map_err(|source| ToolsError::Io {
            path: self.root.clone(),
            source,
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable manifest record {:?}: {}", path, e),
            }
        }

        Ok(records)
    }

    async fn delete(
        &self,
        name: &str,
        edition: Edition,
        schema_version: i32,
    ) -> ToolsResult<bool> {
        let path = self.record_path(name, edition, schema_version);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ToolsError::Io { path, source }),
        }
    }

    async fn delete_schema_older_than(&self, schema_version: i32) -> ToolsResult<u64> {
        let mut deleted = 0;
        for record in self.find_all().await? {
            if record.version < schema_version
                && self.delete(&record.name, record.edition, record.version).await?
            {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn delete_all(&self) -> ToolsResult<u64> {
        let mut deleted = 0;
        for record in self.find_all().await? {
            if self.delete(&record.name, record.edition, record.version).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(name: &str, version: i32) -> StoredManifest {
        StoredManifest {
            id: Uuid::new_v4(),
            name: name.into(),
            version,
            edition: Edition::Java,
            json: r#"{"k":"v"}"#.into(),
        }
    }

    #[tokio::test]
    async fn insert_find_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path().to_path_buf());

        let original = record("1.20.4", 3);
        store.insert(original.clone()).await.unwrap();

        let found = store.find("1.20.4", Edition::Java, 3).await.unwrap();
        assert_eq!(found, Some(original));
        assert!(store.find("1.20.4", Edition::Java, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path().to_path_buf());
        store.insert(record("1.20.4", 3)).await.unwrap();

        assert!(store.delete("1.20.4", Edition::Java, 3).await.unwrap());
        assert!(!store.delete("1.20.4", Edition::Java, 3).await.unwrap());
    }

    #[tokio::test]
    async fn find_all_and_schema_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path().to_path_buf());
        store.insert(record("1.20.4", 3)).await.unwrap();
        store.insert(record("1.19.4", 2)).await.unwrap();
        store.insert(record("1.18.2", 1)).await.unwrap();

        assert_eq!(store.find_all().await.unwrap().len(), 3);
        assert_eq!(store.delete_schema_older_than(3).await.unwrap(), 2);
        assert_eq!(store.find_all().await.unwrap().len(), 1);
        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_root_is_an_empty_store() {
        let store = FsManifestStore::new(PathBuf::from("/nonexistent/packlab-test"));
        assert!(store.find_all().await.unwrap().is_empty());
        assert!(store.find("x", Edition::Java, 3).await.unwrap().is_none());
    }
}
