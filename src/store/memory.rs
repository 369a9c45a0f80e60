use std::sync::RwLock;

use async_trait::async_trait;

use crate::assets::model::StoredManifest;
use crate::catalog::model::Edition;
use crate::error::{ToolsError, ToolsResult};
use crate::store::ManifestStore;

/// Volatile [`ManifestStore`] backed by a plain vector. Used by unit tests
/// and by embedders that don't need durability.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StoredManifest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> ToolsError {
        ToolsError::Other("memory store lock poisoned".into())
    }
}

#[async_trait]
impl ManifestStore for MemoryStore {
    async fn insert(&self, record: StoredManifest) -> ToolsResult<()> {
        let mut records = self.records.write().map_err(|_| Self::lock_err())?;
        records.push(record);
        Ok(())
    }

    async fn find(
        &self,
        name: &str,
        edition: Edition,
        schema_version: i32,
    ) -> ToolsResult<Option<StoredManifest>> {
        let records = self.records.read().map_err(|_| Self::lock_err())?;
        Ok(records
            .iter()
            .find(|r| r.name == name && r.edition == edition && r.version == schema_version)
            .cloned())
    }

    async fn find_all(&self) -> ToolsResult<Vec<StoredManifest>> {
        let records = self.records.read().map_err(|_| Self::lock_err())?;
        Ok(records.clone())
    }

    async fn delete(
        &self,
        name: &str,
        edition: Edition,
        schema_version: i32,
    ) -> ToolsResult<bool> {
        let mut records = self.records.write().map_err(|_| Self::lock_err())?;
        let before = records.len();
        records.retain(|r| !(r.name == name && r.edition == edition && r.version == schema_version));
        Ok(records.len() < before)
    }

    async fn delete_schema_older_than(&self, schema_version: i32) -> ToolsResult<u64> {
        let mut records = self.records.write().map_err(|_| Self::lock_err())?;
        let before = records.len();
        records.retain(|r| r.version >= schema_version);
        Ok((before - records.len()) as u64)
    }

    async fn delete_all(&self) -> ToolsResult<u64> {
        let mut records = self.records.write().map_err(|_| Self::lock_err())?;
        let count = records.len() as u64;
        records.clear();
        Ok(count)
    }
}
