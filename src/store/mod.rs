pub mod cache;
pub mod fs;
pub mod memory;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

pub use cache::{cache_key, ManifestCache};
pub use fs::FsManifestStore;
pub use memory::MemoryStore;

use crate::assets::model::{StoredManifest, SCHEMA_VERSION};
use crate::catalog::model::Edition;
use crate::error::ToolsResult;

/// Durable document-store contract for manifest records, keyed by the
/// composite `(name, edition, schema version)`.
#[async_trait]
pub trait ManifestStore: Send + Sync {
    async fn insert(&self, record: StoredManifest) -> ToolsResult<()>;

    async fn find(
        &self,
        name: &str,
        edition: Edition,
        schema_version: i32,
    ) -> ToolsResult<Option<StoredManifest>>;

    async fn find_all(&self) -> ToolsResult<Vec<StoredManifest>>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, name: &str, edition: Edition, schema_version: i32)
        -> ToolsResult<bool>;

    /// Delete every record with a schema version strictly below the given one.
    async fn delete_schema_older_than(&self, schema_version: i32) -> ToolsResult<u64>;

    async fn delete_all(&self) -> ToolsResult<u64>;
}

/// Two-tier manifest store: a TTL memory cache in front of any
/// [`ManifestStore`] implementation.
pub struct AssetStore {
    store: Arc<dyn ManifestStore>,
    cache: ManifestCache,
}

impl AssetStore {
    pub fn new(store: Arc<dyn ManifestStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: ManifestCache::new(cache_ttl),
        }
    }

    /// Cache hit returns immediately; a durable hit populates the cache
    /// before returning. Store read errors degrade to a miss.
    pub async fn get(
        &self,
        name: &str,
        edition: Edition,
        schema_version: i32,
    ) -> Option<StoredManifest> {
        if let Some(record) = self.cache.get(name, edition, schema_version) {
            return Some(record);
        }

        match self.store.find(name, edition, schema_version).await {
            Ok(Some(record)) => {
                self.cache.set(record.clone());
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Store read failed for {} ({}): {}", name, edition, e);
                None
            }
        }
    }

    /// Write-through to durable storage. The cache is populated lazily on
    /// the next read, not here.
    pub async fn put(&self, record: StoredManifest) -> ToolsResult<()> {
        self.store.insert(record).await
    }

    /// Returns whether a record was removed; failures degrade to `false`
    /// so bulk sweeps can continue.
    pub async fn delete(&self, name: &str, edition: Edition, schema_version: i32) -> bool {
        match self.store.delete(name, edition, schema_version).await {
            Ok(true) => {
                self.cache.remove(name, edition, schema_version);
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("Store delete failed for {} ({}): {}", name, edition, e);
                false
            }
        }
    }

    /// Delete every record whose name is no longer supported or whose
    /// schema version is stale. Returns the number of victims swept.
    pub async fn purge_unsupported(
        &self,
        supported_ids: &HashSet<String>,
        concurrency: usize,
    ) -> ToolsResult<u64> {
        let victims: Vec<StoredManifest> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .filter(|r| !supported_ids.contains(&r.name) || r.version != SCHEMA_VERSION)
            .collect();

        info!("Purging {} unsupported manifest(s)", victims.len());

        let deleted: Vec<bool> = stream::iter(victims.iter())
            .map(|r| self.delete(&r.name, r.edition, r.version))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let failed = deleted.iter().filter(|ok| !**ok).count();
        if failed > 0 {
            warn!("{} manifest deletion(s) failed during purge", failed);
        }

        Ok(victims.len() as u64)
    }

    /// Force regeneration after a schema bump.
    pub async fn purge_stale_schema(&self) -> ToolsResult<u64> {
        self.store.delete_schema_older_than(SCHEMA_VERSION).await
    }

    /// Wipe durable storage and the cache entirely.
    pub async fn purge_all(&self) -> ToolsResult<u64> {
        let count = self.store.delete_all().await?;
        self.cache.clear();
        Ok(count)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::model::StoredManifest;
    use uuid::Uuid;

    fn record(name: &str, edition: Edition, version: i32) -> StoredManifest {
        StoredManifest {
            id: Uuid::new_v4(),
            name: name.into(),
            version,
            edition,
            json: "{}".into(),
        }
    }

    fn asset_store() -> AssetStore {
        AssetStore::new(Arc::new(MemoryStore::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn get_populates_cache_from_durable_store() {
        let store = asset_store();
        store.put(record("1.20.4", Edition::Java, 3)).await.unwrap();

        assert!(store.get("1.20.4", Edition::Java, 3).await.is_some());

        // Second read must be served from cache; dropping the durable copy
        // behind the wrapper's back proves it.
        store.store.delete("1.20.4", Edition::Java, 3).await.unwrap();
        assert!(store.get("1.20.4", Edition::Java, 3).await.is_some());
    }

    #[tokio::test]
    async fn delete_evicts_the_cache() {
        let store = asset_store();
        store.put(record("1.20.4", Edition::Java, 3)).await.unwrap();
        store.get("1.20.4", Edition::Java, 3).await;

        assert!(store.delete("1.20.4", Edition::Java, 3).await);
        assert!(store.get("1.20.4", Edition::Java, 3).await.is_none());
    }

    #[tokio::test]
    async fn purge_unsupported_sweeps_stale_names_and_schemas() {
        let store = asset_store();
        store.put(record("1.20.4", Edition::Java, 3)).await.unwrap();
        store.put(record("1.19.4", Edition::Java, 3)).await.unwrap();
        store.put(record("1.20.4", Edition::Java, 2)).await.unwrap();

        let supported: HashSet<String> = ["1.20.4".to_string()].into_iter().collect();
        let purged = store.purge_unsupported(&supported, 25).await.unwrap();

        assert_eq!(purged, 2);
        assert!(store.get("1.20.4", Edition::Java, 3).await.is_some());
        assert!(store.get("1.19.4", Edition::Java, 3).await.is_none());
        assert!(store.get("1.20.4", Edition::Java, 2).await.is_none());
    }

    #[tokio::test]
    async fn purge_all_reports_count_and_clears_cache() {
        let store = asset_store();
        store.put(record("1.20.4", Edition::Java, 3)).await.unwrap();
        store.put(record("1.20.81.1", Edition::Bedrock, 3)).await.unwrap();
        store.get("1.20.4", Edition::Java, 3).await;

        assert_eq!(store.purge_all().await.unwrap(), 2);
        assert!(store.get("1.20.4", Edition::Java, 3).await.is_none());
    }

    #[tokio::test]
    async fn purge_stale_schema_only_removes_older_versions() {
        let store = asset_store();
        store.put(record("1.20.4", Edition::Java, 3)).await.unwrap();
        store.put(record("1.19.4", Edition::Java, 2)).await.unwrap();
        store.put(record("1.18.2", Edition::Java, 1)).await.unwrap();

        assert_eq!(store.purge_stale_schema().await.unwrap(), 2);
        assert!(store.get("1.20.4", Edition::Java, 3).await.is_some());
    }
}
