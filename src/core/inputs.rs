// ─── Input Detection ───
// Finds the client jar and its version json when they are not given explicitly.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::core::error::{ExportError, ExportResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedInputs {
    pub client_jar: PathBuf,
    pub version_json: PathBuf,
}

/// Resolve the client jar / version json pair.
///
/// Explicit paths win. Otherwise a file whose stem matches the other input is
/// preferred, then the newest paired file, then the newest file of that kind.
pub fn detect_inputs(
    project_root: &Path,
    client_jar: Option<&Path>,
    version_json: Option<&Path>,
) -> ExportResult<DetectedInputs> {
    let mut client_jar = client_jar
        .map(|p| existing_input("Client jar", p))
        .transpose()?;
    let mut version_json = version_json
        .map(|p| existing_input("Version json", p))
        .transpose()?;

    let jars = list_by_extension(project_root, "jar")?;
    let jsons = list_by_extension(project_root, "json")?;
    let jar_stems: HashSet<String> = jars.iter().filter_map(|f| stem(&f.path)).collect();
    let json_stems: HashSet<String> = jsons.iter().filter_map(|f| stem(&f.path)).collect();

    if client_jar.is_none() {
        client_jar = match version_json.as_deref().and_then(stem) {
            Some(wanted) if jar_stems.contains(&wanted) => find_by_stem(&jars, &wanted),
            _ => newest_paired(&jars, &json_stems).or_else(|| newest(&jars)),
        };
    }

    if version_json.is_none() {
        version_json = match client_jar.as_deref().and_then(stem) {
            Some(wanted) if json_stems.contains(&wanted) => find_by_stem(&jsons, &wanted),
            _ => newest_paired(&jsons, &jar_stems).or_else(|| newest(&jsons)),
        };
    }

    let client_jar = client_jar.ok_or(ExportError::InputNotDetected {
        what: "client jar",
        flag: "client-jar",
    })?;
    let version_json = version_json.ok_or(ExportError::InputNotDetected {
        what: "version json",
        flag: "version-json",
    })?;

    debug!("Detected inputs {:?} / {:?}", client_jar, version_json);
    Ok(DetectedInputs {
        client_jar: canonical(&client_jar)?,
        version_json: canonical(&version_json)?,
    })
}

#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    modified: SystemTime,
}

fn list_by_extension(dir: &Path, extension: &str) -> ExportResult<Vec<Candidate>> {
    let entries = std::fs::read_dir(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == extension);
        if !matches || !path.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        out.push(Candidate { path, modified });
    }

    // Newest first; name breaks ties so the scan order is stable.
    out.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(out)
}

fn stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}

fn find_by_stem(files: &[Candidate], wanted: &str) -> Option<PathBuf> {
    files
        .iter()
        .find(|f| stem(&f.path).as_deref() == Some(wanted))
        .map(|f| f.path.clone())
}

fn newest_paired(files: &[Candidate], partner_stems: &HashSet<String>) -> Option<PathBuf> {
    files
        .iter()
        .find(|f| stem(&f.path).is_some_and(|s| partner_stems.contains(&s)))
        .map(|f| f.path.clone())
}

fn newest(files: &[Candidate]) -> Option<PathBuf> {
    files.first().map(|f| f.path.clone())
}

fn existing_input(what: &'static str, path: &Path) -> ExportResult<PathBuf> {
    if !path.exists() {
        return Err(ExportError::InputNotFound {
            what,
            path: path.to_path_buf(),
        });
    }
    canonical(path)
}

fn canonical(path: &Path) -> ExportResult<PathBuf> {
    dunce::canonicalize(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
