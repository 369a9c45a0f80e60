// ─── packlab ───
// Asset resolution, extraction and diffing core for Minecraft resource-pack
// tooling. Library only; the REST surface lives elsewhere.
//
// Architecture:
//   catalog/  — upstream version feeds (Mojang, GitHub) + patch limiting
//   assets/   — manifest model + archive download/extraction
//   store/    — durable manifest store behind a TTL memory cache
//   pack/     — uploaded resource-pack parsing (base assets + overlays)
//   compare/  — regex-filtered three-way set comparison
//   diff/     — byte/pixel version diffing, highlight rendering, export
//   tools     — facade wiring the above together

pub mod assets;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod diff;
pub mod error;
pub mod http;
pub mod pack;
pub mod store;
pub mod tools;

pub use assets::{AssetExtractor, AssetManifest, SCHEMA_VERSION};
pub use catalog::{Edition, VersionCatalog, VersionDescriptor, VersionType};
pub use compare::{
    compare, compare_pack, default_blacklist, ComparisonResult, ExclusionRules, PackComparison,
};
pub use config::ToolsConfig;
pub use diff::{BundleKind, DiffColors, VersionDiff, VersionDiffEngine};
pub use error::{ToolsError, ToolsResult};
pub use pack::{validate_upload, ResourcePack};
pub use store::{AssetStore, FsManifestStore, ManifestStore, MemoryStore};
pub use tools::AssetTools;
