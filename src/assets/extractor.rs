// ─── Asset Extractor ───
// Turns a version descriptor into an asset manifest: resolves the real
// archive URL, downloads it into a scratch folder, lists the texture and
// mcmeta entries, and persists the result.

use std::io::{Read, Seek};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::assets::model::{AssetManifest, MinecraftInfo, StoredManifest, SCHEMA_VERSION};
use crate::catalog::model::{Edition, VersionDescriptor};
use crate::config::ToolsConfig;
use crate::error::{ToolsError, ToolsResult};
use crate::store::AssetStore;

/// Bedrock sample archives wrap their contents under a commit-qualified
/// folder; only the resource pack inside it is relevant.
static BEDROCK_RESOURCE_PACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("Mojang-bedrock-samples-[a-zA-Z0-9]+/resource_pack")
        .expect("bedrock resource pack pattern is valid")
});

/// Split resource-pack overlays shipped with 23w31a / 1.20.2.
fn overlay_cutoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 8, 1, 10, 3, 13)
        .single()
        .expect("valid overlay cutoff timestamp")
}

/// Minimal slice of a Mojang per-version JSON.
#[derive(Debug, Deserialize)]
struct VersionDetails {
    downloads: Option<VersionDownloads>,
}

#[derive(Debug, Deserialize)]
struct VersionDownloads {
    client: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

pub struct AssetExtractor {
    client: reqwest::Client,
    store: Arc<AssetStore>,
    config: Arc<ToolsConfig>,
}

impl AssetExtractor {
    pub fn new(client: reqwest::Client, store: Arc<AssetStore>, config: Arc<ToolsConfig>) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Return the manifest for `version_id`, generating and persisting it on
    /// a cache miss.
    ///
    /// A version missing from `supported` may still have a manifest left
    /// over from before it fell out of the supported window; that cached
    /// copy is served until a purge removes it.
    pub async fn get_or_create(
        &self,
        version_id: &str,
        edition: Edition,
        supported: &[VersionDescriptor],
    ) -> ToolsResult<AssetManifest> {
        let version = supported
            .iter()
            .find(|v| v.id == version_id && v.edition == edition);

        match version {
            None => match self.store.get(version_id, edition, SCHEMA_VERSION).await {
                Some(record) => record.decode(),
                None => Err(ToolsError::VersionNotFound(version_id.to_string())),
            },
            Some(version) => {
                if let Some(record) = self.store.get(version_id, edition, SCHEMA_VERSION).await {
                    return record.decode();
                }
                self.generate(version, edition).await
            }
        }
    }

    /// Resolve the concrete archive download for a version. Java descriptors
    /// point at a metadata JSON that names the client jar; Bedrock
    /// descriptors point at the archive directly.
    pub async fn resolve_archive(&self, version: &VersionDescriptor) -> ToolsResult<DownloadArtifact> {
        match version.edition {
            Edition::Bedrock => Ok(DownloadArtifact {
                url: version.url.clone(),
                sha1: None,
            }),
            Edition::Java => {
                let details: VersionDetails = self
                    .client
                    .get(&version.url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;

                details
                    .downloads
                    .and_then(|d| d.client)
                    .ok_or_else(|| {
                        ToolsError::Other(format!(
                            "No client download listed for version {}",
                            version.id
                        ))
                    })
            }
        }
    }

    /// Download, list, validate and persist one version's assets.
    ///
    /// The scratch folder is removed unconditionally, success or failure.
    async fn generate(
        &self,
        version: &VersionDescriptor,
        edition: Edition,
    ) -> ToolsResult<AssetManifest> {
        let scratch = self.config.scratch_root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&scratch)
            .await
            .map_err(|source| ToolsError::Io {
                path: scratch.clone(),
                source,
            })?;

        let result = self.generate_in(version, edition, &scratch).await;

        if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
            error!("Failed to clean scratch folder {:?}: {}", scratch, e);
        }

        result
    }

    async fn generate_in(
        &self,
        version: &VersionDescriptor,
        edition: Edition,
        scratch: &Path,
    ) -> ToolsResult<AssetManifest> {
        info!("Generating {} assets for {}", edition, version.id);

        let artifact = self.resolve_archive(version).await?;
        let archive_path = scratch.join("archive.zip");
        self.download_archive(&artifact, &archive_path).await?;

        let listing_path = archive_path.clone();
        let (textures, mc_metas) = tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&listing_path).map_err(|source| ToolsError::Io {
                path: listing_path.clone(),
                source,
            })?;
            match edition {
                Edition::Java => java_file_list(file),
                Edition::Bedrock => bedrock_file_list(file),
            }
        })
        .await??;

        if textures.is_empty() && mc_metas.is_empty() {
            error!("Failed to extract any assets for {}", version.id);
            return Err(ToolsError::GenerationFailed(version.id.clone()));
        }

        let manifest = AssetManifest {
            name: version.id.clone(),
            version: SCHEMA_VERSION,
            created_date: Utc::now(),
            minecraft: MinecraftInfo {
                version: version.id.clone(),
                version_type: version.version_type,
                edition,
                release_time: version.release_time,
            },
            textures,
            mc_metas,
            overlay_support: version.release_time >= overlay_cutoff(),
        };

        self.store.put(StoredManifest::encode(&manifest)?).await?;
        info!(
            "Generated manifest for {} ({} textures, {} mcmetas)",
            version.id,
            manifest.textures.len(),
            manifest.mc_metas.len()
        );
        Ok(manifest)
    }

    /// Stream an archive to disk, validating SHA-1 when the upstream
    /// metadata provides one.
    async fn download_archive(&self, artifact: &DownloadArtifact, dest: &Path) -> ToolsResult<()> {
        let response = self.client.get(&artifact.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolsError::DownloadFailed {
                url: artifact.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        if let Some(expected) = &artifact.sha1 {
            let mut hasher = Sha1::new();
            hasher.update(&bytes);
            let actual = hex::encode(hasher.finalize());
            if actual != *expected {
                return Err(ToolsError::Sha1Mismatch {
                    url: artifact.url.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|source| ToolsError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        file.write_all(&bytes)
            .await
            .map_err(|source| ToolsError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        file.flush().await.map_err(|source| ToolsError::Io {
            path: dest.to_path_buf(),
            source,
        })?;

        debug!("Downloaded {} -> {:?}", artifact.url, dest);
        Ok(())
    }
}

/// List the comparison-relevant entries of a Java client jar: everything
/// under the top-level `data` tree is excluded, `png` entries are textures
/// and `mcmeta` entries are metadata.
pub(crate) fn java_file_list<R: Read + Seek>(reader: R) -> ToolsResult<(Vec<String>, Vec<String>)> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut textures = Vec::new();
    let mut mc_metas = Vec::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name();

        if name.starts_with("data") {
            continue;
        }
        if name.ends_with("png") {
            textures.push(name.to_string());
        } else if name.ends_with("mcmeta") {
            mc_metas.push(name.to_string());
        }
    }

    Ok((textures, mc_metas))
}

/// List the resource-pack entries of a Bedrock samples archive. The
/// wrapping commit-qualified folder prefix is stripped; `png` and `tga`
/// entries count as textures and Bedrock has no mcmetas.
pub(crate) fn bedrock_file_list<R: Read + Seek>(
    reader: R,
) -> ToolsResult<(Vec<String>, Vec<String>)> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut textures = Vec::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name();

        if !BEDROCK_RESOURCE_PACK.is_match(name) {
            continue;
        }
        let stripped = BEDROCK_RESOURCE_PACK
            .replace(name, "")
            .trim_start_matches(['/', '\\'])
            .to_string();
        if stripped.ends_with("png") || stripped.ends_with("tga") {
            textures.push(stripped);
        }
    }

    Ok((textures, Vec::new()))
}
