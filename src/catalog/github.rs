// ─── Bedrock Release Feed ───
// Reads the bedrock-samples release list from the GitHub REST API and maps
// the newest preview/stable pair onto version descriptors.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::catalog::model::{Edition, VersionDescriptor, VersionType};
use crate::error::{ToolsError, ToolsResult};

/// A release as reported by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRelease {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub prerelease: bool,
    pub zipball_url: String,
}

pub async fn fetch_releases(
    client: &reqwest::Client,
    api_base: &str,
    repo: &str,
) -> ToolsResult<Vec<RepoRelease>> {
    let url = format!("{api_base}/repos/{repo}/releases");
    info!("Fetching release list for {}", repo);

    let releases: Vec<RepoRelease> = client
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| ToolsError::UpstreamUnreachable {
            upstream: "GitHub".into(),
            source,
        })?
        .json()
        .await
        .map_err(|source| ToolsError::UpstreamUnreachable {
            upstream: "GitHub".into(),
            source,
        })?;

    Ok(releases)
}

/// The newest pre-release becomes the `beta` entry, the newest full release
/// the `release` entry. Each release tag is normalized into a version id.
pub fn select_bedrock_versions(releases: &[RepoRelease]) -> Vec<VersionDescriptor> {
    let mut versions = Vec::new();

    let newest = |prerelease: bool| {
        releases
            .iter()
            .filter(|r| r.prerelease == prerelease)
            .max_by_key(|r| r.created_at)
    };

    if let Some(preview) = newest(true) {
        versions.push(to_descriptor(preview, VersionType::Beta));
    }
    if let Some(stable) = newest(false) {
        versions.push(to_descriptor(stable, VersionType::Release));
    }

    versions
}

fn to_descriptor(release: &RepoRelease, version_type: VersionType) -> VersionDescriptor {
    VersionDescriptor {
        id: trim_release_id(&release.name),
        version_type,
        edition: Edition::Bedrock,
        url: release.zipball_url.clone(),
        time: release.created_at,
        release_time: release.created_at,
    }
}

/// `v1.21.0.20-preview` → `1.21.0.20`
fn trim_release_id(release_name: &str) -> String {
    release_name
        .trim_start_matches('v')
        .replace("-preview", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: &str, created_at: &str, prerelease: bool) -> RepoRelease {
        RepoRelease {
            name: name.into(),
            created_at: created_at.parse().unwrap(),
            prerelease,
            zipball_url: format!("https://example.com/{name}.zip"),
        }
    }

    #[test]
    fn trims_release_ids() {
        assert_eq!(trim_release_id("v1.21.0.20-preview"), "1.21.0.20");
        assert_eq!(trim_release_id("v1.20.81.1"), "1.20.81.1");
        assert_eq!(trim_release_id("1.20.81.1"), "1.20.81.1");
    }

    #[test]
    fn picks_newest_preview_and_stable() {
        let releases = vec![
            release("v1.21.0.20-preview", "2024-05-01T10:00:00Z", true),
            release("v1.20.80.20-preview", "2024-04-01T10:00:00Z", true),
            release("v1.20.81.1", "2024-04-20T10:00:00Z", false),
            release("v1.20.73.1", "2024-03-20T10:00:00Z", false),
        ];
        let versions = select_bedrock_versions(&releases);

        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].id, "1.21.0.20");
        assert_eq!(versions[0].version_type, VersionType::Beta);
        assert_eq!(versions[1].id, "1.20.81.1");
        assert_eq!(versions[1].version_type, VersionType::Release);
        assert!(versions.iter().all(|v| v.edition == Edition::Bedrock));
    }

    #[test]
    fn empty_release_list_yields_no_versions() {
        assert!(select_bedrock_versions(&[]).is_empty());
    }
}
