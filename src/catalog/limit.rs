// ─── Patch Limiting ───
// Collapses a raw version list down to one entry per minor release line,
// keeping the latest snapshot visible.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::catalog::model::{Edition, VersionDescriptor, VersionType};

/// Versions released before this point predate reliable asset hosting
/// (1.5.2) and are never offered.
fn oldest_supported() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2013, 4, 24, 15, 45, 0)
        .single()
        .expect("valid cutoff timestamp")
}

/// Apply the highest-patch policy to a raw version list.
///
/// With `bypass_limit` the cutoff-filtered list is returned unchanged,
/// newest first. Otherwise only the newest `release` per `MAJOR.MINOR`
/// line survives, with one exception: an id with a single component or any
/// letter in it (snapshots, pre-releases, RCs) is kept while its release
/// time is at least as new as the newest entry overall.
///
/// The `MAJOR.MINOR` check is a plain string-prefix test, so e.g. `1.2.x`
/// is shadowed by an already-kept `1.20.x`. Upstream id formats are known
/// to interact oddly with this policy (April Fools' snapshots); keep the
/// behavior as-is rather than tightening it.
pub fn limit_versions(
    versions: Vec<VersionDescriptor>,
    bypass_limit: bool,
) -> Vec<VersionDescriptor> {
    let cutoff = oldest_supported();

    let mut filtered: Vec<VersionDescriptor> = versions
        .into_iter()
        .filter(|v| v.release_time > cutoff)
        .collect();
    filtered.sort_by(|a, b| b.release_time.cmp(&a.release_time));

    if bypass_limit {
        return filtered;
    }

    let mut kept: Vec<VersionDescriptor> = Vec::new();
    let newest_time = match filtered.first() {
        Some(v) => v.release_time,
        None => return kept,
    };

    for v in &filtered {
        let split: Vec<&str> = v.id.split('.').collect();
        let has_letter = v.id.chars().any(|c| c.is_alphabetic());

        if (split.len() == 1 || has_letter) && v.release_time >= newest_time {
            kept.push(v.clone());
        } else if v.edition == Edition::Java && v.id.contains('.') && !v.id.contains('-') {
            match split.iter().map(|s| s.parse::<u32>()).collect::<Result<Vec<u32>, _>>() {
                Ok(parts) if parts.len() >= 2 => {
                    let prefix = format!("{}.{}", parts[0], parts[1]);
                    let line_taken = kept.iter().any(|k| {
                        k.id.starts_with(&prefix) && k.version_type == VersionType::Release
                    });
                    if !line_taken {
                        kept.push(v.clone());
                    }
                }
                _ => {
                    warn!("Failed to parse version id '{}' for patch limiting", v.id);
                }
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(id: &str, version_type: VersionType, release_time: &str) -> VersionDescriptor {
        VersionDescriptor {
            id: id.into(),
            version_type,
            edition: Edition::Java,
            url: "u".into(),
            time: release_time.parse().unwrap(),
            release_time: release_time.parse().unwrap(),
        }
    }

    #[test]
    fn bypass_returns_cutoff_filtered_list_newest_first() {
        let versions = vec![
            version("1.5.1", VersionType::Release, "2013-03-21T10:00:00Z"),
            version("1.20.2", VersionType::Release, "2023-09-21T09:00:00Z"),
            version("1.20.4", VersionType::Release, "2023-12-07T08:00:00Z"),
        ];
        let limited = limit_versions(versions, true);
        let ids: Vec<&str> = limited.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.4", "1.20.2"]);
    }

    #[test]
    fn keeps_only_highest_patch_per_minor_line() {
        let versions = vec![
            version("1.20.4", VersionType::Release, "2023-12-07T08:00:00Z"),
            version("1.20.2", VersionType::Release, "2023-09-21T09:00:00Z"),
            version("1.19.4", VersionType::Release, "2023-03-14T09:00:00Z"),
            version("1.19.2", VersionType::Release, "2022-08-05T09:00:00Z"),
        ];
        let limited = limit_versions(versions, false);
        let ids: Vec<&str> = limited.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.4", "1.19.4"]);
    }

    #[test]
    fn newest_snapshot_survives_limiting() {
        let versions = vec![
            version("24w07a", VersionType::Snapshot, "2024-02-14T09:00:00Z"),
            version("1.20.4", VersionType::Release, "2023-12-07T08:00:00Z"),
            version("23w46a", VersionType::Snapshot, "2023-11-16T09:00:00Z"),
        ];
        let limited = limit_versions(versions, false);
        let ids: Vec<&str> = limited.iter().map(|v| v.id.as_str()).collect();
        // The stale snapshot is neither newest nor a parseable release line.
        assert_eq!(ids, vec!["24w07a", "1.20.4"]);
    }

    #[test]
    fn minor_prefix_is_a_string_match() {
        // "1.2" shadowed by the already-kept "1.20" line.
        let versions = vec![
            version("1.20.4", VersionType::Release, "2023-12-07T08:00:00Z"),
            version("1.2.5", VersionType::Release, "2013-05-02T09:00:00Z"),
        ];
        let limited = limit_versions(versions, false);
        let ids: Vec<&str> = limited.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.4"]);
    }

    #[test]
    fn hyphenated_and_unparsable_ids_are_skipped() {
        let versions = vec![
            version("1.20.4", VersionType::Release, "2023-12-07T08:00:00Z"),
            version("1.RV-Pre1", VersionType::Snapshot, "2016-03-31T09:00:00Z"),
        ];
        let limited = limit_versions(versions, false);
        let ids: Vec<&str> = limited.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.4"]);
    }

    #[test]
    fn pre_cutoff_versions_are_dropped_entirely() {
        let versions = vec![version("1.5.1", VersionType::Release, "2013-03-21T10:00:00Z")];
        assert!(limit_versions(versions, false).is_empty());
    }
}
