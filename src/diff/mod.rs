// ─── Version Diff Engine ───
// Deep byte- and pixel-level comparison of two versions' extracted asset
// sets. Works on full file bytes, bypassing the manifest cache.

pub mod export;
pub mod render;

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

use sha1::{Digest, Sha1};
use tracing::{debug, info};

pub use export::{bundle_file_name, export_bundle, export_changed_highlighted, BundleKind};
pub use render::{DiffColors, RenderedDiff};

use crate::assets::model::AssetManifest;
use crate::catalog::model::Edition;
use crate::error::{ToolsError, ToolsResult};

/// Extracted archive contents: path → raw bytes.
pub type AssetBytes = HashMap<String, Vec<u8>>;

/// Every path classified into exactly one bucket. Lists are sorted for
/// stable output.
#[derive(Debug, Clone, Default)]
pub struct DiffClassification {
    pub same: Vec<String>,
    pub different: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// A completed version diff: classification plus both extracted file sets,
/// kept around for rendering and export.
pub struct VersionDiff {
    pub from_id: String,
    pub to_id: String,
    pub classification: DiffClassification,
    pub from_files: AssetBytes,
    pub to_files: AssetBytes,
}

impl VersionDiff {
    /// Render the visual highlight for one changed asset.
    pub fn render_diff_image(&self, path: &str, colors: &DiffColors) -> ToolsResult<RenderedDiff> {
        let from = self.from_files.get(path).ok_or_else(|| {
            ToolsError::Other(format!("Asset {path} is not part of the source version"))
        })?;
        let to = self.to_files.get(path).ok_or_else(|| {
            ToolsError::Other(format!("Asset {path} is not part of the target version"))
        })?;
        render::render_diff(from, to, path, colors)
    }
}

pub struct VersionDiffEngine {
    client: reqwest::Client,
}

impl VersionDiffEngine {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Diff two versions' archives. Only Java is supported; Bedrock sample
    /// archives are not distributed per-version in a diffable form.
    pub async fn diff_versions(
        &self,
        from: &AssetManifest,
        to: &AssetManifest,
        from_url: &str,
        to_url: &str,
        include_mcmetas: bool,
    ) -> ToolsResult<VersionDiff> {
        if from.minecraft.edition != Edition::Java || to.minecraft.edition != Edition::Java {
            return Err(ToolsError::Unsupported(
                "version diffing is only available for Java edition".into(),
            ));
        }

        let wanted = wanted_paths(from, to, include_mcmetas);
        info!(
            "Diffing {} -> {} over {} candidate path(s)",
            from.name,
            to.name,
            wanted.len()
        );

        let (from_files, to_files) = tokio::try_join!(
            self.fetch_assets(from_url, wanted.clone()),
            self.fetch_assets(to_url, wanted)
        )?;

        let classification = classify(&from_files, &to_files);
        info!(
            "Diff complete: {} same, {} different, {} added, {} removed",
            classification.same.len(),
            classification.different.len(),
            classification.added.len(),
            classification.removed.len()
        );

        Ok(VersionDiff {
            from_id: from.name.clone(),
            to_id: to.name.clone(),
            classification,
            from_files,
            to_files,
        })
    }

    /// Download an archive and extract the wanted entries into memory.
    async fn fetch_assets(&self, url: &str, wanted: HashSet<String>) -> ToolsResult<AssetBytes> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolsError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        debug!("Downloaded {} ({} bytes)", url, bytes.len());

        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_ref()))?;
            let mut files = AssetBytes::new();

            for i in 0..archive.len() {
                let mut entry = archive.by_index(i)?;
                if !wanted.contains(entry.name()) {
                    continue;
                }
                let name = entry.name().to_string();
                let mut contents = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut contents).map_err(|source| {
                    ToolsError::Io {
                        path: name.clone().into(),
                        source,
                    }
                })?;
                files.insert(name, contents);
            }

            if files.is_empty() {
                return Err(ToolsError::GenerationFailed(url));
            }
            Ok(files)
        })
        .await?
    }
}

/// The union of both versions' texture paths, optionally widened with the
/// mcmeta sidecar of every png.
fn wanted_paths(from: &AssetManifest, to: &AssetManifest, include_mcmetas: bool) -> HashSet<String> {
    let mut wanted: HashSet<String> = from
        .textures
        .iter()
        .chain(to.textures.iter())
        .cloned()
        .collect();

    if include_mcmetas {
        let sidecars: Vec<String> = wanted
            .iter()
            .filter(|p| p.ends_with(".png"))
            .map(|p| format!("{p}.mcmeta"))
            .collect();
        wanted.extend(sidecars);
    }

    wanted
}

/// Classify every path across the two file sets.
///
/// Equal content hashes short-circuit to `same`; on a mismatch the bytes
/// are decoded and compared pixel-by-pixel, so re-encoded but visually
/// identical textures still count as `same`.
pub fn classify(from_files: &AssetBytes, to_files: &AssetBytes) -> DiffClassification {
    let mut result = DiffClassification::default();

    for (path, from_bytes) in from_files {
        match to_files.get(path) {
            None => result.removed.push(path.clone()),
            Some(to_bytes) => {
                if content_hash(from_bytes) == content_hash(to_bytes)
                    || render::images_identical(from_bytes, to_bytes)
                {
                    result.same.push(path.clone());
                } else {
                    result.different.push(path.clone());
                }
            }
        }
    }

    for path in to_files.keys() {
        if !from_files.contains_key(path) {
            result.added.push(path.clone());
        }
    }

    result.same.sort();
    result.different.sort();
    result.added.sort();
    result.removed.sort();
    result
}

fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn encode(pixels: &[[u8; 4]], width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut img = RgbaImage::new(width, height);
        for (i, p) in pixels.iter().enumerate() {
            img.put_pixel(i as u32 % width, i as u32 / width, Rgba(*p));
        }
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), format).unwrap();
        out
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    fn files(entries: Vec<(&str, Vec<u8>)>) -> AssetBytes {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn identical_bytes_short_circuit_to_same() {
        // Not an image at all: hash equality must settle it alone.
        let from = files(vec![("a.png.mcmeta", b"{\"animation\":{}}".to_vec())]);
        let to = files(vec![("a.png.mcmeta", b"{\"animation\":{}}".to_vec())]);
        let result = classify(&from, &to);
        assert_eq!(result.same, vec!["a.png.mcmeta".to_string()]);
        assert!(result.different.is_empty());
    }

    #[test]
    fn reencoded_pixel_identical_images_are_same() {
        use image::codecs::png::{CompressionType, FilterType, PngEncoder};
        use image::{ExtendedColorType, ImageEncoder};

        let plain = encode(&[RED, GREEN], 2, 1, ImageFormat::Png);

        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba(RED));
        img.put_pixel(1, 0, Rgba(GREEN));
        let mut reencoded = Vec::new();
        PngEncoder::new_with_quality(
            Cursor::new(&mut reencoded),
            CompressionType::Best,
            FilterType::Paeth,
        )
        .write_image(img.as_raw(), 2, 1, ExtendedColorType::Rgba8)
        .unwrap();
        assert_ne!(plain, reencoded);

        let result = classify(
            &files(vec![("a.png", plain)]),
            &files(vec![("a.png", reencoded)]),
        );
        assert_eq!(result.same, vec!["a.png".to_string()]);
    }

    #[test]
    fn changed_pixels_and_changed_text_are_different() {
        let from = files(vec![
            ("a.png", encode(&[RED], 1, 1, ImageFormat::Png)),
            ("b.png.mcmeta", b"{\"a\":1}".to_vec()),
        ]);
        let to = files(vec![
            ("a.png", encode(&[GREEN], 1, 1, ImageFormat::Png)),
            ("b.png.mcmeta", b"{\"a\":2}".to_vec()),
        ]);
        let result = classify(&from, &to);
        assert_eq!(
            result.different,
            vec!["a.png".to_string(), "b.png.mcmeta".to_string()]
        );
    }

    #[test]
    fn presence_only_paths_are_added_or_removed() {
        let from = files(vec![("gone.png", vec![1, 2, 3])]);
        let to = files(vec![("new.png", vec![1, 2, 3])]);
        let result = classify(&from, &to);
        assert_eq!(result.removed, vec!["gone.png".to_string()]);
        assert_eq!(result.added, vec!["new.png".to_string()]);
        assert!(result.same.is_empty());
    }

    #[test]
    fn dimension_mismatch_classifies_as_different() {
        let from = files(vec![("a.png", encode(&[RED], 1, 1, ImageFormat::Png))]);
        let to = files(vec![(
            "a.png",
            encode(&[RED, RED, RED, RED], 2, 2, ImageFormat::Png),
        )]);
        let result = classify(&from, &to);
        assert_eq!(result.different, vec!["a.png".to_string()]);
    }

    #[test]
    fn wanted_paths_union_and_mcmeta_widening() {
        use crate::assets::model::{MinecraftInfo, SCHEMA_VERSION};
        use crate::catalog::model::VersionType;
        use chrono::Utc;

        let manifest = |textures: &[&str]| AssetManifest {
            name: "x".into(),
            version: SCHEMA_VERSION,
            created_date: Utc::now(),
            minecraft: MinecraftInfo {
                version: "x".into(),
                version_type: VersionType::Release,
                edition: Edition::Java,
                release_time: Utc::now(),
            },
            textures: textures.iter().map(|t| t.to_string()).collect(),
            mc_metas: Vec::new(),
            overlay_support: true,
        };

        let from = manifest(&["a.png", "b.png"]);
        let to = manifest(&["b.png", "c.png"]);

        let plain = wanted_paths(&from, &to, false);
        assert_eq!(plain.len(), 3);

        let widened = wanted_paths(&from, &to, true);
        assert_eq!(widened.len(), 6);
        assert!(widened.contains("a.png.mcmeta"));
        assert!(widened.contains("c.png.mcmeta"));
    }

    #[test]
    fn render_diff_image_requires_both_sides() {
        let diff = VersionDiff {
            from_id: "1.20".into(),
            to_id: "1.21".into(),
            classification: DiffClassification::default(),
            from_files: files(vec![("a.png", encode(&[RED], 1, 1, ImageFormat::Png))]),
            to_files: AssetBytes::new(),
        };
        assert!(diff
            .render_diff_image("a.png", &DiffColors::default())
            .is_err());
    }
}
