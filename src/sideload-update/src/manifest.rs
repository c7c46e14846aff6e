//! Manifest wire format.
//!
//! A manifest is the JSON document an extension author publishes next to
//! their download packages: `{ "versions": [ ... ] }`, newest entries
//! wherever they like. Ordering only matters for breaking ties between
//! equal versions. Manifests are fetched fresh on every check and never
//! cached.

use serde::{Deserialize, Serialize};

/// Remote manifest: the set of published versions of one extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Published version candidates, in manifest order.
    #[serde(default)]
    pub versions: Vec<VersionCandidate>,
}

/// One downloadable version of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCandidate {
    /// Version string
    pub version: String,

    /// Zip package URL
    pub url: String,

    /// SHA-256 of the package bytes, hex-encoded
    pub hash: String,

    /// Release notes shown to the operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Details page URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,

    /// Minimum host application version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_app: Option<String>,

    /// Maximum host application version (exclusive at equality)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_app: Option<String>,

    /// Minimum host runtime version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_runtime: Option<String>,

    /// Maximum host runtime version (exclusive at equality)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_runtime: Option<String>,

    /// Minimum installed extension version this package updates from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    /// Maximum installed extension version this package updates from
    /// (exclusive at equality)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,
}

/// Raw document shape used to drop malformed entries without rejecting
/// the whole manifest.
#[derive(Deserialize)]
struct RawManifest {
    versions: Vec<serde_json::Value>,
}

impl Manifest {
    /// Parse a manifest document.
    ///
    /// A document without a `versions` array is an error; entries missing
    /// `version`, `url`, or `hash` are silently dropped.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        let raw: RawManifest = serde_json::from_str(content)?;
        let versions = raw
            .versions
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        Ok(Self { versions })
    }
}

#[cfg(test)]
pub(crate) fn candidate(version: &str, url: &str, hash: &str) -> VersionCandidate {
    VersionCandidate {
        version: version.to_string(),
        url: url.to_string(),
        hash: hash.to_string(),
        description: None,
        detail_url: None,
        min_app: None,
        max_app: None,
        min_runtime: None,
        max_runtime: None,
        min_version: None,
        max_version: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let manifest = Manifest::parse(
            r#"{
                "versions": [
                    {"version": "2.4", "url": "https://example.com/a-2.4.zip", "hash": "aa"},
                    {"version": "2.5", "url": "https://example.com/a-2.5.zip", "hash": "bb",
                     "description": "Fixes", "min_app": "6.0"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.versions.len(), 2);
        assert_eq!(manifest.versions[1].description.as_deref(), Some("Fixes"));
        assert_eq!(manifest.versions[1].min_app.as_deref(), Some("6.0"));
    }

    #[test]
    fn test_parse_drops_incomplete_entries() {
        let manifest = Manifest::parse(
            r#"{
                "versions": [
                    {"version": "2.4", "url": "https://example.com/a.zip", "hash": "aa"},
                    {"version": "2.5", "url": "https://example.com/b.zip"},
                    {"url": "https://example.com/c.zip", "hash": "cc"},
                    "not an object"
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.versions.len(), 1);
        assert_eq!(manifest.versions[0].version, "2.4");
    }

    #[test]
    fn test_parse_rejects_missing_versions() {
        assert!(Manifest::parse(r#"{"releases": []}"#).is_err());
        assert!(Manifest::parse("[]").is_err());
        assert!(Manifest::parse("not json").is_err());
    }
}
