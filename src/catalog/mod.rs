pub mod github;
pub mod limit;
pub mod model;
pub mod mojang;

use std::sync::Arc;

pub use limit::limit_versions;
pub use model::{Edition, VersionDescriptor, VersionType};

use crate::config::ToolsConfig;
use crate::error::ToolsResult;

/// Produces the authoritative, policy-filtered list of supported versions
/// per edition from the upstream feeds.
pub struct VersionCatalog {
    client: reqwest::Client,
    config: Arc<ToolsConfig>,
}

impl VersionCatalog {
    pub fn new(client: reqwest::Client, config: Arc<ToolsConfig>) -> Self {
        Self { client, config }
    }

    /// Supported Java versions, patch-limited unless bypassed.
    pub async fn java_versions(&self, bypass_limit: bool) -> ToolsResult<Vec<VersionDescriptor>> {
        let manifest =
            mojang::VersionManifest::fetch(&self.client, &self.config.mojang_manifest_url).await?;
        let selected = mojang::select_java_versions(&manifest);
        Ok(limit::limit_versions(selected, bypass_limit))
    }

    /// Supported Bedrock versions: the newest preview and the newest stable
    /// release. The patch-limiting policy does not apply here.
    pub async fn bedrock_versions(&self) -> ToolsResult<Vec<VersionDescriptor>> {
        let releases = github::fetch_releases(
            &self.client,
            &self.config.github_api_base,
            &self.config.bedrock_repo,
        )
        .await?;
        Ok(github::select_bedrock_versions(&releases))
    }

    /// Supported versions for either edition.
    pub async fn versions(
        &self,
        edition: Edition,
        bypass_limit: bool,
    ) -> ToolsResult<Vec<VersionDescriptor>> {
        match edition {
            Edition::Java => self.java_versions(bypass_limit).await,
            Edition::Bedrock => self.bedrock_versions().await,
        }
    }
}
