// ─── Classpath Builder ───
// Resolves manifest libraries against a local library store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::platform::CurrentPlatform;
use crate::core::version::DependencyManifest;

/// Fragment shared by every native-library artifact path.
const NATIVES_FRAGMENT: &str = "-natives-";

/// Ordered classpath entries plus the libraries that were not on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Client artifact first, then libraries in manifest order.
    pub entries: Vec<PathBuf>,
    pub missing_paths: Vec<PathBuf>,
}

impl ResolutionReport {
    /// Number of resolved entries besides the client artifact.
    pub fn library_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn missing(&self) -> usize {
        self.missing_paths.len()
    }
}

/// Builds the classpath entries for `manifest`.
///
/// Libraries are skipped when their rules disallow `platform`, when they carry
/// no artifact, or when they are native jars for another platform. A library
/// whose jar is missing from `libraries_dir` is counted and reported but never
/// aborts resolution.
pub fn resolve_classpath(
    manifest: &DependencyManifest,
    libraries_dir: &Path,
    client_jar: &Path,
    platform: &CurrentPlatform,
) -> ResolutionReport {
    let mut report = ResolutionReport {
        entries: vec![client_jar.to_path_buf()],
        ..ResolutionReport::default()
    };
    let mut seen = HashSet::from([dedup_key(client_jar)]);

    for lib in &manifest.libraries {
        if !lib.is_allowed_on(platform) {
            debug!("Skipping library (OS rule): {}", lib.display_name());
            continue;
        }

        let Some(artifact_path) = lib.artifact_path() else {
            continue;
        };

        if is_foreign_native(artifact_path, platform) {
            debug!("Skipping foreign native library: {}", artifact_path);
            continue;
        }

        let jar_path = store_path(libraries_dir, artifact_path);
        if !jar_path.exists() {
            warn!("Missing library jar: {}", jar_path.display());
            report.missing_paths.push(jar_path);
            continue;
        }

        let resolved = dunce::canonicalize(&jar_path).unwrap_or(jar_path);
        if seen.insert(dedup_key(&resolved)) {
            report.entries.push(resolved);
        } else {
            debug!("Duplicate classpath entry dropped: {:?}", resolved);
        }
    }

    report
}

/// True for `-natives-` jars that target a platform other than `platform`.
pub fn is_foreign_native(artifact_path: &str, platform: &CurrentPlatform) -> bool {
    artifact_path.contains(NATIVES_FRAGMENT) && !artifact_path.contains(platform.os.native_marker())
}

/// Join a slash-separated manifest path onto the store root.
fn store_path(libraries_dir: &Path, artifact_path: &str) -> PathBuf {
    artifact_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(libraries_dir.to_path_buf(), |acc, segment| acc.join(segment))
}

fn dedup_key(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(target_os = "windows") {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

/// Full `-cp` value: the compiled exporter classes, then every resolved entry.
pub fn join_classpath(compiled_dir: &Path, report: &ResolutionReport) -> String {
    std::iter::once(compiled_dir)
        .chain(report.entries.iter().map(PathBuf::as_path))
        .map(|path| path.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(get_classpath_separator())
}

/// Platform-specific Java classpath separator.
pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}
