use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::model::{Edition, VersionType};
use crate::error::ToolsResult;

/// Bumped whenever the manifest's derived content or the extraction rules
/// change; all previously cached manifests become stale.
pub const SCHEMA_VERSION: i32 = 3;

/// The cached list of texture and metadata file paths belonging to one
/// version+edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    pub name: String,
    /// Extractor schema version, not a Minecraft version.
    pub version: i32,
    pub created_date: DateTime<Utc>,
    pub minecraft: MinecraftInfo,
    pub textures: Vec<String>,
    #[serde(rename = "mcMetas")]
    pub mc_metas: Vec<String>,
    pub overlay_support: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftInfo {
    pub version: String,
    #[serde(rename = "type")]
    pub version_type: VersionType,
    pub edition: Edition,
    pub release_time: DateTime<Utc>,
}

/// Durable-store record: the manifest serialized to JSON plus its
/// composite identity `(name, edition, schema version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredManifest {
    pub id: Uuid,
    pub name: String,
    pub version: i32,
    pub edition: Edition,
    pub json: String,
}

impl StoredManifest {
    pub fn encode(manifest: &AssetManifest) -> ToolsResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: manifest.name.clone(),
            version: manifest.version,
            edition: manifest.minecraft.edition,
            json: serde_json::to_string(manifest)?,
        })
    }

    pub fn decode(&self) -> ToolsResult<AssetManifest> {
        Ok(serde_json::from_str(&self.json)?)
    }
}
