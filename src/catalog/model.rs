use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two incompatible Minecraft client variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Java,
    Bedrock,
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edition::Java => write!(f, "java"),
            Edition::Bedrock => write!(f, "bedrock"),
        }
    }
}

/// Release channel of a version entry.
///
/// Mojang's manifest also ships `old_beta`/`old_alpha` entries; those land
/// in `Other` and are filtered out by catalog selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    Release,
    Snapshot,
    Beta,
    #[serde(other)]
    Other,
}

/// One official version as reported by an upstream feed.
///
/// Produced fresh on every catalog fetch; never persisted. Identity is
/// `(id, edition)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: VersionType,
    pub edition: Edition,
    pub url: String,
    pub time: DateTime<Utc>,
    pub release_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_descriptor() {
        let json = r#"{
            "id": "1.20.4",
            "type": "release",
            "edition": "java",
            "url": "https://example.com/1.20.4.json",
            "time": "2023-12-07T08:17:00+00:00",
            "releaseTime": "2023-12-07T08:00:00+00:00"
        }"#;
        let v: VersionDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(v.id, "1.20.4");
        assert_eq!(v.version_type, VersionType::Release);
        assert_eq!(v.edition, Edition::Java);
    }

    #[test]
    fn unknown_version_type_maps_to_other() {
        let v: VersionType = serde_json::from_str(r#""old_alpha""#).unwrap();
        assert_eq!(v, VersionType::Other);
    }
}
