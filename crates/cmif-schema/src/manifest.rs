use crate::dependency::Dependency;
use crate::file::{Archive, FileProvides};
use crate::types::{Name, Uri};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseJson(#[from] serde_json::Error),
}

/// Root record describing one artifact: identity, versions, sources,
/// dependency trees, and provided files.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Manifest {
    pub artifact_version: Version,
    pub manifest_version: Version,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Archive>,
    /// Authoritative source of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Uri>,
    pub name: Name,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<FileProvides>,
}

impl Manifest {
    /// A manifest with only the required fields set.
    pub fn new(
        name: impl Into<Name>,
        artifact_version: Version,
        manifest_version: Version,
    ) -> Self {
        Self {
            artifact_version,
            manifest_version,
            sources: Vec::new(),
            origin: None,
            name: name.into(),
            licenses: Vec::new(),
            dependencies: Vec::new(),
            provides: Vec::new(),
        }
    }

    /// Top-level dependency trees whose root is named `name`.
    pub fn dependencies_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Dependency> {
        self.dependencies.iter().filter(move |d| d.name() == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = serde_json::from_str(input)?;
    debug!(
        "parsed manifest '{}' {} ({} dependencies, {} provides)",
        manifest.name,
        manifest.artifact_version,
        manifest.dependencies.len(),
        manifest.provides.len()
    );
    Ok(manifest)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    debug!("reading manifest {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "artifact_version": {"major": 1, "minor": 3, "build": 1},
        "manifest_version": {"major": 1},
        "name": "zlib",
        "origin": "https://zlib.net",
        "licenses": ["Zlib"],
        "sources": [
            {"uri": "https://zlib.net/zlib-1.3.1.tar.gz", "hash": "9855b6d802d7fe5b7bd5b196a2271655"}
        ],
        "dependencies": [
            {"type": "range-dependency", "name": "glibc",
             "range": {"version_start": {"major": 2, "minor": 17},
                       "version_end": {"major": 3}, "end_exclusive": true}},
            {"type": "version-dependency", "name": "make", "version": {"major": 4}}
        ],
        "provides": [
            {"name": "zlib.h", "uri": "usr/include/zlib.h",
             "traits": [{"is_header": true, "language": "c"}]}
        ]
    }"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = parse_manifest_str(FULL).expect("should parse");
        assert_eq!(manifest.name, "zlib");
        assert_eq!(manifest.artifact_version.to_string(), "1.3.1");
        assert_eq!(manifest.sources.len(), 1);
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.provides[0].traits[0].language, "c");
        assert_eq!(manifest.licenses, vec!["Zlib"]);
    }

    #[test]
    fn parses_minimal_manifest() {
        let manifest = parse_manifest_str(
            r#"{"artifact_version": {"major": 0}, "manifest_version": {"major": 1}, "name": "x"}"#,
        )
        .expect("should parse");
        assert!(manifest.dependencies.is_empty());
        assert!(manifest.origin.is_none());
    }

    #[test]
    fn rejects_missing_required_fields() {
        assert!(parse_manifest_str(r#"{"manifest_version": {"major": 1}, "name": "x"}"#).is_err());
        assert!(parse_manifest_str(
            r#"{"artifact_version": {"major": 0}, "manifest_version": {"major": 1}}"#
        )
        .is_err());
    }

    #[test]
    fn rejects_out_of_range_version() {
        let err = parse_manifest_str(
            r#"{"artifact_version": {"major": 1000}, "manifest_version": {"major": 1}, "name": "x"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("major"));
    }

    #[test]
    fn serialized_form_reparses_to_equal_manifest() {
        let manifest = parse_manifest_str(FULL).unwrap();
        let again = parse_manifest_str(&manifest.to_json_pretty().unwrap()).unwrap();
        assert_eq!(manifest, again);
    }

    #[test]
    fn dependencies_named_filters_top_level() {
        let manifest = parse_manifest_str(FULL).unwrap();
        let found: Vec<_> = manifest.dependencies_named("glibc").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), "range-dependency");
        assert_eq!(manifest.dependencies_named("absent").count(), 0);
    }

    #[test]
    fn parse_manifest_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, FULL).unwrap();
        let manifest = parse_manifest_file(&path).unwrap();
        assert_eq!(manifest.name, "zlib");
        assert!(matches!(
            parse_manifest_file(dir.path().join("missing.json")),
            Err(ManifestError::Io(_))
        ));
    }
}
