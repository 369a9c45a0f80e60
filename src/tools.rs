// ─── Asset Tools Facade ───
// Wires the catalog, extractor and store together behind the surface the
// REST layer calls.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::assets::extractor::AssetExtractor;
use crate::assets::model::AssetManifest;
use crate::catalog::model::{Edition, VersionDescriptor};
use crate::catalog::VersionCatalog;
use crate::config::ToolsConfig;
use crate::diff::{DiffColors, VersionDiff, VersionDiffEngine};
use crate::error::{ToolsError, ToolsResult};
use crate::pack::{self, ResourcePack};
use crate::store::{AssetStore, ManifestStore};

pub struct AssetTools {
    client: reqwest::Client,
    catalog: VersionCatalog,
    extractor: AssetExtractor,
    store: Arc<AssetStore>,
    config: Arc<ToolsConfig>,
}

impl AssetTools {
    pub fn new(
        client: reqwest::Client,
        store: Arc<dyn ManifestStore>,
        config: ToolsConfig,
    ) -> Self {
        let config = Arc::new(config);
        let store = Arc::new(AssetStore::new(store, config.cache_ttl));
        Self {
            catalog: VersionCatalog::new(client.clone(), config.clone()),
            extractor: AssetExtractor::new(client.clone(), store.clone(), config.clone()),
            client,
            store,
            config,
        }
    }

    /// Supported versions for an edition, newest first.
    pub async fn list_versions(
        &self,
        edition: Edition,
        bypass_limit: bool,
    ) -> ToolsResult<Vec<VersionDescriptor>> {
        self.catalog.versions(edition, bypass_limit).await
    }

    /// Manifest for one version, generated and persisted on first request.
    pub async fn get_manifest(
        &self,
        edition: Edition,
        version_id: &str,
        bypass_limit: bool,
    ) -> ToolsResult<AssetManifest> {
        let supported = self.catalog.versions(edition, bypass_limit).await?;
        self.extractor
            .get_or_create(version_id, edition, &supported)
            .await
    }

    /// Direct download URL of a Java version's client jar.
    pub async fn java_jar_url(&self, version_id: &str) -> ToolsResult<String> {
        let supported = self.catalog.java_versions(true).await?;
        let version = supported
            .iter()
            .find(|v| v.id == version_id && v.edition == Edition::Java)
            .ok_or_else(|| ToolsError::VersionNotFound(version_id.to_string()))?;

        Ok(self.extractor.resolve_archive(version).await?.url)
    }

    /// Bulk-warm manifests for every supported version (or an explicit
    /// subset), bounded to the configured concurrency. Individual failures
    /// are logged and skipped.
    pub async fn pregenerate(
        &self,
        edition: Edition,
        versions: Option<Vec<VersionDescriptor>>,
    ) -> ToolsResult<bool> {
        let versions = match versions {
            Some(v) if !v.is_empty() => v,
            _ => self.catalog.versions(edition, false).await?,
        };

        info!("Pregenerating {} {} manifest(s)", versions.len(), edition);

        stream::iter(versions.iter())
            .map(|version| {
                let supported = &versions;
                async move {
                    if let Err(e) = self
                        .extractor
                        .get_or_create(&version.id, edition, supported)
                        .await
                    {
                        warn!("Pregeneration of {} failed: {}", version.id, e);
                    }
                }
            })
            .buffer_unordered(self.config.bulk_concurrency.max(1))
            .collect::<Vec<()>>()
            .await;

        Ok(true)
    }

    /// Drop every stored manifest that is no longer in the supported
    /// window or carries a stale schema. Returns the victim count.
    pub async fn purge_unsupported(&self) -> ToolsResult<u64> {
        let (java, bedrock) = tokio::try_join!(
            self.catalog.java_versions(true),
            self.catalog.bedrock_versions()
        )?;

        let supported_ids: HashSet<String> = java
            .into_iter()
            .chain(bedrock)
            .map(|v| v.id)
            .collect();

        self.store
            .purge_unsupported(&supported_ids, self.config.bulk_concurrency)
            .await
    }

    pub async fn purge_stale_schema(&self) -> ToolsResult<u64> {
        self.store.purge_stale_schema().await
    }

    pub async fn purge_all(&self) -> ToolsResult<u64> {
        self.store.purge_all().await
    }

    pub fn clear_cache(&self) {
        self.store.clear_cache();
    }

    /// Compare an uploaded pack against a reference manifest under the
    /// given exclusion patterns.
    pub fn compare_pack(
        &self,
        manifest: &AssetManifest,
        pack: &ResourcePack,
        exclusion_patterns: &[String],
        include_mcmetas: bool,
    ) -> ToolsResult<crate::compare::PackComparison> {
        let rules = crate::compare::ExclusionRules::compile(exclusion_patterns)?;
        Ok(crate::compare::compare_pack(
            manifest,
            pack,
            &rules,
            include_mcmetas,
        ))
    }

    /// Validate and parse an uploaded resource pack.
    pub fn load_pack(
        &self,
        file_name: &str,
        bytes: &[u8],
        edition: Edition,
    ) -> ToolsResult<ResourcePack> {
        pack::validate_upload(
            file_name,
            bytes.len() as u64,
            edition,
            self.config.max_pack_bytes,
        )?;
        ResourcePack::load(file_name, bytes, edition)
    }

    /// Deep-diff two Java versions' archives. Manifests and jar URLs are
    /// resolved first; the heavy lifting happens in the diff engine.
    pub async fn diff_versions(
        &self,
        from_id: &str,
        to_id: &str,
        include_mcmetas: bool,
    ) -> ToolsResult<VersionDiff> {
        let (from, to) = tokio::try_join!(
            self.get_manifest(Edition::Java, from_id, false),
            self.get_manifest(Edition::Java, to_id, false)
        )?;
        let (from_url, to_url) =
            tokio::try_join!(self.java_jar_url(from_id), self.java_jar_url(to_id))?;

        VersionDiffEngine::new(self.client.clone())
            .diff_versions(&from, &to, &from_url, &to_url, include_mcmetas)
            .await
    }

    /// Render the highlight image for one changed asset of a completed diff.
    pub fn render_diff_image(
        &self,
        diff: &VersionDiff,
        path: &str,
    ) -> ToolsResult<Vec<u8>> {
        Ok(diff.render_diff_image(path, &DiffColors::default())?.png)
    }
}
