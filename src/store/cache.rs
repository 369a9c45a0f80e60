// ─── Manifest Cache ───
// TTL-expiring in-memory layer in front of the durable store. Keys are a
// stable hash of the record's composite identity.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sha1::{Digest, Sha1};

use crate::assets::model::StoredManifest;
use crate::catalog::model::Edition;

/// Stable cache key for `(name, edition, schema version)`.
///
/// Any deterministic fixed-length digest works here; SHA-1 of the
/// colon-joined identity keeps keys filename-safe as well.
pub fn cache_key(name: &str, edition: Edition, schema_version: i32) -> String {
    let input = format!("{name}:{edition}:{schema_version}");
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

struct CacheEntry {
    record: StoredManifest,
    expires_at: Instant,
}

/// Concurrent TTL map. Reads dominate; expired entries are simply ignored
/// and overwritten by the next populate.
pub struct ManifestCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ManifestCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, name: &str, edition: Edition, schema_version: i32) -> Option<StoredManifest> {
        let key = cache_key(name, edition, schema_version);
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.record.clone())
    }

    pub fn set(&self, record: StoredManifest) {
        let key = cache_key(&record.name, record.edition, record.version);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key,
                CacheEntry {
                    record,
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
    }

    pub fn remove(&self, name: &str, edition: Edition, schema_version: i32) {
        let key = cache_key(name, edition, schema_version);
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
