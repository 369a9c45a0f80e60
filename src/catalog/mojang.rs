// ─── Mojang Version Manifest ───
// Fetches and parses the official Java version manifest, then selects the
// entries relevant to asset tooling.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::catalog::model::{Edition, VersionDescriptor, VersionType};
use crate::error::{ToolsError, ToolsResult};

/// Top-level Mojang version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: VersionType,
    pub url: String,
    pub time: DateTime<Utc>,
    pub release_time: DateTime<Utc>,
}

impl ManifestEntry {
    fn to_descriptor(&self) -> VersionDescriptor {
        VersionDescriptor {
            id: self.id.clone(),
            version_type: self.version_type,
            edition: Edition::Java,
            url: self.url.clone(),
            time: self.time,
            release_time: self.release_time,
        }
    }
}

impl VersionManifest {
    /// Fetch the version manifest from Mojang using a shared HTTP client.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> ToolsResult<Self> {
        info!("Fetching Minecraft version manifest...");

        let manifest: VersionManifest = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| ToolsError::UpstreamUnreachable {
                upstream: "Mojang".into(),
                source,
            })?
            .json()
            .await
            .map_err(|source| ToolsError::UpstreamUnreachable {
                upstream: "Mojang".into(),
                source,
            })?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }
}

/// Select the Java versions worth offering for asset comparison.
///
/// Keeps every full release plus the tagged latest release/snapshot, then
/// surfaces active development builds: up to 3 snapshots newer than the
/// latest release (by upload time) and the single snapshot immediately
/// preceding it. Deduplicated by id, newest release first.
pub fn select_java_versions(manifest: &VersionManifest) -> Vec<VersionDescriptor> {
    let latest_release = &manifest.latest.release;
    let latest_snapshot = &manifest.latest.snapshot;

    let mut versions: Vec<VersionDescriptor> = manifest
        .versions
        .iter()
        .filter(|v| {
            v.version_type == VersionType::Release
                || v.id == *latest_release
                || v.id == *latest_snapshot
        })
        .map(ManifestEntry::to_descriptor)
        .collect();

    if let Some(release) = versions.iter().find(|v| v.id == *latest_release) {
        let release_time = release.release_time;

        let mut newer: Vec<&ManifestEntry> = manifest
            .versions
            .iter()
            .filter(|v| v.version_type == VersionType::Snapshot && v.release_time > release_time)
            .collect();
        newer.sort_by(|a, b| b.time.cmp(&a.time));
        newer.truncate(3);

        let mut older: Vec<&ManifestEntry> = manifest
            .versions
            .iter()
            .filter(|v| v.version_type == VersionType::Snapshot && v.release_time < release_time)
            .collect();
        older.sort_by(|a, b| b.release_time.cmp(&a.release_time));
        older.truncate(1);

        newer.extend(older);
        for entry in newer {
            if versions.iter().all(|v| v.id != entry.id) {
                versions.push(entry.to_descriptor());
            }
        }
    }

    versions.sort_by(|a, b| b.release_time.cmp(&a.release_time));
    versions.dedup_by(|a, b| a.id == b.id);
    versions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_json() -> &'static str {
        r#"{
            "latest": { "release": "1.20.4", "snapshot": "24w07a" },
            "versions": [
                { "id": "24w07a", "type": "snapshot", "url": "u", "time": "2024-02-14T10:00:00+00:00", "releaseTime": "2024-02-14T09:00:00+00:00" },
                { "id": "24w06a", "type": "snapshot", "url": "u", "time": "2024-02-07T10:00:00+00:00", "releaseTime": "2024-02-07T09:00:00+00:00" },
                { "id": "24w05b", "type": "snapshot", "url": "u", "time": "2024-02-01T10:00:00+00:00", "releaseTime": "2024-02-01T09:00:00+00:00" },
                { "id": "24w04a", "type": "snapshot", "url": "u", "time": "2024-01-24T10:00:00+00:00", "releaseTime": "2024-01-24T09:00:00+00:00" },
                { "id": "1.20.4", "type": "release", "url": "u", "time": "2023-12-07T08:17:00+00:00", "releaseTime": "2023-12-07T08:00:00+00:00" },
                { "id": "23w46a", "type": "snapshot", "url": "u", "time": "2023-11-16T10:00:00+00:00", "releaseTime": "2023-11-16T09:00:00+00:00" },
                { "id": "23w45a", "type": "snapshot", "url": "u", "time": "2023-11-09T10:00:00+00:00", "releaseTime": "2023-11-09T09:00:00+00:00" },
                { "id": "1.20.2", "type": "release", "url": "u", "time": "2023-09-21T10:00:00+00:00", "releaseTime": "2023-09-21T09:00:00+00:00" },
                { "id": "b1.8.1", "type": "old_beta", "url": "u", "time": "2011-09-19T10:00:00+00:00", "releaseTime": "2011-09-19T09:00:00+00:00" }
            ]
        }"#
    }

    #[test]
    fn selects_releases_and_dev_snapshots() {
        let manifest: VersionManifest = serde_json::from_str(manifest_json()).unwrap();
        let versions = select_java_versions(&manifest);
        let ids: Vec<&str> = versions.iter().map(|v| v.id.as_str()).collect();

        // All releases, 3 newest post-release snapshots, 1 preceding snapshot.
        assert!(ids.contains(&"1.20.4"));
        assert!(ids.contains(&"1.20.2"));
        assert!(ids.contains(&"24w07a"));
        assert!(ids.contains(&"24w06a"));
        assert!(ids.contains(&"24w05b"));
        assert!(ids.contains(&"23w46a"));
        // Beyond the 3-snapshot window and not the immediate predecessor.
        assert!(!ids.contains(&"24w04a"));
        assert!(!ids.contains(&"23w45a"));
        // Legacy channels never selected.
        assert!(!ids.contains(&"b1.8.1"));
    }

    #[test]
    fn selection_is_sorted_newest_first_and_deduplicated() {
        let manifest: VersionManifest = serde_json::from_str(manifest_json()).unwrap();
        let versions = select_java_versions(&manifest);

        assert!(versions
            .windows(2)
            .all(|w| w[0].release_time >= w[1].release_time));
        let mut ids: Vec<&str> = versions.iter().map(|v| v.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), versions.len());
        assert!(versions.iter().all(|v| v.edition == Edition::Java));
    }
}
