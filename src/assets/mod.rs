pub mod extractor;
pub mod model;

pub use extractor::{AssetExtractor, DownloadArtifact};
pub use model::{AssetManifest, MinecraftInfo, StoredManifest, SCHEMA_VERSION};
