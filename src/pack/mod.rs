// ─── Resource Pack Loader ───
// Parses an uploaded zip/mcpack into base assets plus the overlay
// sub-packs declared in pack.mcmeta. No network involved.

use std::io::{Cursor, Read};

use serde::Deserialize;
use tracing::debug;

use crate::catalog::model::Edition;
use crate::error::{ToolsError, ToolsResult};

const IMAGE_FILE_TYPES: [&str; 2] = ["png", "tga"];

/// One named bucket of pack files. The base bucket is always present;
/// overlays can be toggled without re-parsing the archive.
#[derive(Debug, Clone)]
pub struct AssetGroup {
    pub name: String,
    pub textures: Vec<String>,
    pub mc_metas: Vec<String>,
    pub enabled: bool,
}

impl AssetGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            textures: Vec::new(),
            mc_metas: Vec::new(),
            enabled: true,
        }
    }
}

/// A parsed user-uploaded resource pack.
#[derive(Debug, Clone)]
pub struct ResourcePack {
    pub name: String,
    pub size: u64,
    pub base_assets: AssetGroup,
    pub overlays: Vec<AssetGroup>,
}

/// `pack.mcmeta` fragment naming overlay directories. Anything malformed
/// or absent simply means "no overlays".
#[derive(Debug, Deserialize)]
struct PackMeta {
    overlays: Option<PackOverlays>,
}

#[derive(Debug, Deserialize)]
struct PackOverlays {
    #[serde(default)]
    entries: Vec<PackOverlayEntry>,
}

#[derive(Debug, Deserialize)]
struct PackOverlayEntry {
    directory: Option<String>,
}

/// Ensure an uploaded file is acceptable before parsing. All violations
/// are reported together.
pub fn validate_upload(
    file_name: &str,
    size: u64,
    edition: Edition,
    max_bytes: u64,
) -> ToolsResult<()> {
    let mut errors = Vec::new();

    if size > max_bytes {
        errors.push(format!(
            "Uploads cannot be greater than {}MB",
            max_bytes / 1024 / 1024
        ));
    }

    let file_type = file_name.rsplit('.').next().unwrap_or_default();
    match edition {
        Edition::Java => {
            if file_type != "zip" {
                errors.push("Only zip files are supported".into());
            }
        }
        Edition::Bedrock => {
            if file_type != "zip" && file_type != "mcpack" {
                errors.push("Only zip and mcpack files are supported".into());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ToolsError::PackValidation(errors))
    }
}

impl ResourcePack {
    /// Parse an uploaded archive. Two passes: overlay discovery from
    /// `pack.mcmeta` (Java only), then entry classification.
    pub fn load(name: &str, bytes: &[u8], edition: Edition) -> ToolsResult<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

        let mut pack = Self {
            name: name.into(),
            size: bytes.len() as u64,
            base_assets: AssetGroup::new("Assets"),
            overlays: Vec::new(),
        };

        if edition == Edition::Java {
            pack.overlays = discover_overlays(&mut archive)?;
        }

        for i in 0..archive.len() {
            let full_name = archive.by_index(i)?.name().to_string();
            pack.classify_entry(&full_name, edition);
        }

        debug!(
            "Parsed pack '{}': {} base textures, {} overlays",
            pack.name,
            pack.base_assets.textures.len(),
            pack.overlays.len()
        );
        Ok(pack)
    }

    fn classify_entry(&mut self, full_name: &str, edition: Edition) {
        let Some(file_name) = accepted_name(full_name, edition) else {
            return;
        };
        let folder = top_level_dir(file_name);
        let ext = file_extension(file_name);

        let is_base = match folder {
            None => true,
            Some(folder) => {
                (edition == Edition::Java && folder == "assets")
                    || (edition == Edition::Bedrock && folder == "textures")
            }
        };

        if is_base {
            if IMAGE_FILE_TYPES.contains(&ext.as_str()) {
                self.base_assets.textures.push(file_name.to_string());
            } else if ext == "mcmeta" && file_name != "pack.mcmeta" {
                self.base_assets.mc_metas.push(file_name.to_string());
            }
        } else if let Some(folder) = folder {
            let prefix = format!("{folder}/");
            let Some(overlay) = self.overlays.iter_mut().find(|o| o.name == folder) else {
                return;
            };
            let Some(relative) = file_name.strip_prefix(&prefix) else {
                return;
            };
            if IMAGE_FILE_TYPES.contains(&ext.as_str()) {
                overlay.textures.push(relative.to_string());
            } else if ext == "mcmeta" {
                overlay.mc_metas.push(relative.to_string());
            }
        }
    }

    /// Base plus every enabled overlay, deduplicated.
    pub fn effective_textures(&self) -> Vec<String> {
        dedup_union(
            &self.base_assets.textures,
            self.overlays
                .iter()
                .filter(|o| o.enabled)
                .map(|o| &o.textures),
        )
    }

    pub fn effective_mcmetas(&self) -> Vec<String> {
        dedup_union(
            &self.base_assets.mc_metas,
            self.overlays
                .iter()
                .filter(|o| o.enabled)
                .map(|o| &o.mc_metas),
        )
    }

    /// Full in-archive path of a texture: the base copy wins, then enabled
    /// overlays in declaration order.
    pub fn resolve_texture_path(&self, path: &str) -> Option<String> {
        if self.base_assets.textures.iter().any(|t| t == path) {
            return Some(path.to_string());
        }
        self.overlays
            .iter()
            .find(|o| o.enabled && o.textures.iter().any(|t| t == path))
            .map(|o| format!("{}/{}", o.name, path))
    }

    /// Returns whether an overlay with that name exists.
    pub fn set_overlay_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.overlays.iter_mut().find(|o| o.name == name) {
            Some(overlay) => {
                overlay.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

/// Read `pack.mcmeta` and cross-reference its declared overlay directories
/// against the archive's actual top-level folders.
fn discover_overlays<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> ToolsResult<Vec<AssetGroup>> {
    let mut declared: Vec<String> = Vec::new();

    let meta_index = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .map(|e| e.name().to_lowercase() == "pack.mcmeta")
            .unwrap_or(false)
    });

    if let Some(i) = meta_index {
        let mut raw = String::new();
        if archive.by_index(i)?.read_to_string(&mut raw).is_ok() {
            declared = overlay_directories(&raw);
        }
    }

    if declared.is_empty() {
        return Ok(Vec::new());
    }

    let mut present: Vec<String> = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if let Some(dir) = top_level_dir(entry.name()) {
            if !present.iter().any(|p| p == dir) {
                present.push(dir.to_string());
            }
        }
    }

    Ok(declared
        .iter()
        .filter(|d| d.as_str() != "assets" && present.iter().any(|p| p == *d))
        .map(|d| AssetGroup::new(d))
        .collect())
}

fn overlay_directories(raw: &str) -> Vec<String> {
    let Ok(meta) = serde_json::from_str::<PackMeta>(raw) else {
        return Vec::new();
    };
    meta.overlays
        .map(|o| {
            o.entries
                .into_iter()
                .filter_map(|e| e.directory)
                .filter(|d| !d.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// An entry is interesting if it is a png (any edition), an mcmeta (Java)
/// or a tga (Bedrock).
fn accepted_name(name: &str, edition: Edition) -> Option<&str> {
    if name.ends_with("png")
        || (edition == Edition::Java && name.ends_with("mcmeta"))
        || (edition == Edition::Bedrock && name.ends_with("tga"))
    {
        Some(name)
    } else {
        None
    }
}

/// The path segment before the first `/`; entries without one have no
/// directory.
fn top_level_dir(full_path: &str) -> Option<&str> {
    let mut split = full_path.split('/');
    let first = split.next()?;
    split.next().map(|_| first)
}

fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

fn dedup_union<'a>(
    base: &'a [String],
    overlays: impl Iterator<Item = &'a Vec<String>>,
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for path in base.iter().chain(overlays.flatten()) {
        if seen.insert(path.as_str()) {
            result.push(path.clone());
        }
    }
    result
}
