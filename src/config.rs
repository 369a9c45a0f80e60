use std::path::PathBuf;
use std::time::Duration;

const MAX_PACK_SIZE_MB: u64 = 100;

/// Runtime configuration shared by the tooling components.
///
/// Constructed once by the embedding application and passed into
/// [`crate::tools::AssetTools`]. The upstream URL fields exist so tests
/// and mirrors can point the catalog at a different host.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Maximum accepted resource-pack upload size, in bytes.
    pub max_pack_bytes: u64,
    /// TTL for the in-memory manifest cache.
    pub cache_ttl: Duration,
    /// Parallelism cap for bulk operations (pregeneration, purges).
    pub bulk_concurrency: usize,
    /// Root directory for per-generation scratch folders.
    pub scratch_root: PathBuf,
    /// Mojang version manifest endpoint (Java edition).
    pub mojang_manifest_url: String,
    /// GitHub REST API base (Bedrock edition release feed).
    pub github_api_base: String,
    /// `owner/repo` of the Bedrock samples repository.
    pub bedrock_repo: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_pack_bytes: MAX_PACK_SIZE_MB * 1024 * 1024,
            cache_ttl: Duration::from_secs(12 * 60 * 60),
            bulk_concurrency: 25,
            scratch_root: std::env::temp_dir().join("packlab-assetgen"),
            mojang_manifest_url: "https://launchermeta.mojang.com/mc/game/version_manifest.json"
                .into(),
            github_api_base: "https://api.github.com".into(),
            bedrock_repo: "Mojang/bedrock-samples".into(),
        }
    }
}

impl ToolsConfig {
    pub fn max_pack_mb(&self) -> u64 {
        self.max_pack_bytes / 1024 / 1024
    }
}
