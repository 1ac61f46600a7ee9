// ─── Dependency Manifest ───
// Parses a Mojang version JSON down to the parts the classpath needs.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{ExportError, ExportResult};

/// Java major assumed when the manifest does not declare one.
pub const DEFAULT_JAVA_MAJOR: u32 = 21;

/// A parsed version JSON. Unknown top-level keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyManifest {
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    #[serde(default)]
    pub major_version: Option<u32>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Default, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<PlatformRule>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
}

#[derive(Debug, Deserialize)]
pub struct LibDownloadArtifact {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

/// Closed set: any other `action` string fails deserialization.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    /// Regular expression searched in the OS version string.
    #[serde(default)]
    pub version: Option<String>,
}

impl LibraryEntry {
    /// Relative `downloads.artifact.path`, if the entry carries a jar.
    pub fn artifact_path(&self) -> Option<&str> {
        self.downloads
            .as_ref()?
            .artifact
            .as_ref()?
            .path
            .as_deref()
            .filter(|path| !path.is_empty())
    }

    /// Label used in logs: the Maven name, else the artifact path.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.artifact_path())
            .unwrap_or("<unnamed>")
    }
}

impl DependencyManifest {
    /// Read and parse a version JSON from disk.
    pub fn load(path: &Path) -> ExportResult<Self> {
        if !path.exists() {
            return Err(ExportError::InputNotFound {
                what: "Version json",
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    /// Parse manifest text; `source` is only used to name the file in errors.
    pub fn parse(raw: &str, source: &Path) -> ExportResult<Self> {
        let manifest: Self =
            serde_json::from_str(raw).map_err(|err| ExportError::ManifestParse {
                path: source.to_path_buf(),
                source: err,
            })?;
        debug!(
            "Loaded {:?} with {} libraries",
            source,
            manifest.libraries.len()
        );
        Ok(manifest)
    }

    /// Required Java major version, defaulting to 21.
    pub fn required_java_major(&self) -> u32 {
        self.java_version
            .as_ref()
            .and_then(|j| j.major_version)
            .unwrap_or(DEFAULT_JAVA_MAJOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(value: serde_json::Value) -> ExportResult<DependencyManifest> {
        DependencyManifest::parse(&value.to_string(), &PathBuf::from("1.21.json"))
    }

    #[test]
    fn java_major_defaults_to_21() {
        let manifest = parse(serde_json::json!({ "libraries": [] })).unwrap();
        assert_eq!(manifest.required_java_major(), 21);

        let manifest = parse(serde_json::json!({ "javaVersion": { "component": "x" } })).unwrap();
        assert_eq!(manifest.required_java_major(), 21);
    }

    #[test]
    fn java_major_is_read_from_manifest() {
        let manifest = parse(serde_json::json!({
            "javaVersion": { "component": "java-runtime-gamma", "majorVersion": 17 },
            "libraries": []
        }))
        .unwrap();
        assert_eq!(manifest.required_java_major(), 17);
    }

    #[test]
    fn metadata_only_entries_have_no_artifact_path() {
        let manifest = parse(serde_json::json!({
            "libraries": [
                { "name": "a:b:1.0" },
                { "name": "c:d:1.0", "downloads": {} },
                { "name": "e:f:1.0", "downloads": { "artifact": { "path": "e/f/1.0/f-1.0.jar" } } }
            ]
        }))
        .unwrap();

        assert_eq!(manifest.libraries[0].artifact_path(), None);
        assert_eq!(manifest.libraries[1].artifact_path(), None);
        assert_eq!(
            manifest.libraries[2].artifact_path(),
            Some("e/f/1.0/f-1.0.jar")
        );
    }

    #[test]
    fn unknown_rule_action_is_rejected() {
        let err = parse(serde_json::json!({
            "libraries": [{ "rules": [{ "action": "maybe" }] }]
        }))
        .unwrap_err();

        match err {
            ExportError::ManifestParse { path, .. } => assert_eq!(path, PathBuf::from("1.21.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_document_names_the_source() {
        let err = DependencyManifest::parse("{ not json", &PathBuf::from("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DependencyManifest::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ExportError::InputNotFound { .. }));
    }
}
