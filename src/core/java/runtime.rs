use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::core::error::{ExportError, ExportResult};

/// Vendor installation roots searched on Windows, each globbed with
/// `jdk*/bin/<binary>.exe`.
const WINDOWS_VENDOR_ROOTS: [&str; 3] = [
    "C:/Program Files/Eclipse Adoptium",
    "C:/Program Files/Java",
    "C:/Program Files/Microsoft",
];

/// Where candidate executables are looked up. Built once from the process
/// environment; tests build it by hand.
#[derive(Debug, Clone, Default)]
pub struct JavaSearch {
    pub java_home: Option<PathBuf>,
    pub path_entries: Vec<PathBuf>,
    pub vendor_roots: Vec<PathBuf>,
    pub exe_suffix: &'static str,
    pub case_insensitive: bool,
}

impl JavaSearch {
    pub fn from_env() -> Self {
        let java_home = std::env::var_os("JAVA_HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from);
        let path_entries = std::env::var_os("PATH")
            .map(|raw| std::env::split_paths(&raw).collect())
            .unwrap_or_default();
        let vendor_roots = if cfg!(windows) {
            WINDOWS_VENDOR_ROOTS.iter().map(PathBuf::from).collect()
        } else {
            Vec::new()
        };

        Self {
            java_home,
            path_entries,
            vendor_roots,
            exe_suffix: exe_suffix(),
            case_insensitive: cfg!(windows),
        }
    }

    fn file_name(&self, binary_name: &str) -> String {
        format!("{}{}", binary_name, self.exe_suffix)
    }

    /// First executable match of `binary_name` on the search path.
    fn which(&self, binary_name: &str) -> Option<PathBuf> {
        let file_name = self.file_name(binary_name);
        self.path_entries
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| is_executable(candidate))
    }

    fn vendor_matches(&self, binary_name: &str) -> Vec<PathBuf> {
        let file_name = self.file_name(binary_name);
        let mut out = Vec::new();
        for root in &self.vendor_roots {
            let pattern = format!(
                "{}/jdk*/bin/{}",
                glob::Pattern::escape(&root.to_string_lossy()),
                file_name
            );
            match glob::glob(&pattern) {
                Ok(paths) => out.extend(paths.filter_map(Result::ok)),
                Err(err) => debug!("Skipping vendor glob {}: {}", pattern, err),
            }
        }
        out
    }

    fn identity_key(&self, path: &Path) -> String {
        let text = path.to_string_lossy();
        if self.case_insensitive {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }
}

/// A runtime that probed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRuntime {
    pub path: PathBuf,
    pub major: u32,
}

/// Asks an executable for its Java major version.
pub trait VersionProbe {
    fn probe(&self, path: &Path) -> ExportResult<u32>;
}

/// Runs `<java> -version` and parses the banner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandProbe;

impl VersionProbe for CommandProbe {
    fn probe(&self, path: &Path) -> ExportResult<u32> {
        probe_version(path)
    }
}

/// Candidate executables for `binary_name`, in priority order, unprobed.
pub fn discover(
    search: &JavaSearch,
    explicit: Option<&Path>,
    binary_name: &str,
) -> ExportResult<Vec<PathBuf>> {
    if let Some(explicit) = explicit {
        return Ok(vec![existing_path(explicit)?]);
    }

    let mut candidates = Vec::new();

    if let Some(home) = &search.java_home {
        candidates.push(home.join("bin").join(search.file_name(binary_name)));
    }

    if let Some(on_path) = search.which(binary_name) {
        candidates.push(on_path);
    }

    candidates.extend(search.vendor_matches(binary_name));

    let unique = unique_existing(search, candidates);
    if unique.is_empty() {
        return Err(ExportError::ExecutableNotFound {
            binary: binary_name.to_string(),
        });
    }
    debug!("Discovered {} candidate(s) for {}", unique.len(), binary_name);
    Ok(unique)
}

/// Major version reported by `<path> -version`.
#[instrument]
pub fn probe_version(path: &Path) -> ExportResult<u32> {
    let output = Command::new(path)
        .arg("-version")
        .output()
        .map_err(|err| ExportError::VersionParse {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })?;

    let banner = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    debug!(
        "Probing {:?}: {}",
        path,
        banner.lines().find(|l| !l.trim().is_empty()).unwrap_or("")
    );

    parse_java_major(&banner).ok_or_else(|| ExportError::VersionParse {
        path: path.to_path_buf(),
        detail: "no version token in -version output".to_string(),
    })
}

/// Extracts the major from a banner such as `openjdk version "17.0.8"`.
/// Legacy `1.X` banners report `X`.
pub fn parse_java_major(banner: &str) -> Option<u32> {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    let re = VERSION_RE.get_or_init(|| {
        Regex::new(r#"version "([0-9]+)(?:\.([0-9]+))?"#).expect("static version regex")
    });

    let caps = re.captures(banner)?;
    let major: u32 = caps.get(1)?.as_str().parse().ok()?;
    if major == 1 {
        if let Some(minor) = caps.get(2) {
            return minor.as_str().parse().ok();
        }
    }
    Some(major)
}

/// Pick the highest-versioned working runtime and check it against `required_major`.
#[instrument(skip(search))]
pub fn select_runtime(
    search: &JavaSearch,
    required_major: u32,
    explicit: Option<&Path>,
) -> ExportResult<SelectedRuntime> {
    let candidates = discover(search, explicit, "java")?;
    select_from_candidates(&candidates, &CommandProbe, required_major)
}

/// Selection over an already discovered candidate list.
pub fn select_from_candidates(
    candidates: &[PathBuf],
    probe: &dyn VersionProbe,
    required_major: u32,
) -> ExportResult<SelectedRuntime> {
    let mut best: Option<SelectedRuntime> = None;

    for candidate in candidates {
        let major = match probe.probe(candidate) {
            Ok(major) => major,
            Err(err) => {
                debug!("Skipping unusable runtime {:?}: {}", candidate, err);
                continue;
            }
        };

        let is_better = best.as_ref().map_or(true, |current| major > current.major);
        if is_better {
            best = Some(SelectedRuntime {
                path: candidate.clone(),
                major,
            });
        }
    }

    let best = best.ok_or_else(|| ExportError::NoUsableRuntime {
        binary: "java".to_string(),
    })?;

    if best.major < required_major {
        return Err(ExportError::VersionTooLow {
            path: best.path,
            required: required_major,
            found: best.major,
        });
    }

    info!("Selected Java {} at {:?}", best.major, best.path);
    Ok(best)
}

/// Locate `javac` for the selected runtime: explicit path, then a sibling of
/// the runtime, then the regular discovery search.
pub fn select_companion(
    search: &JavaSearch,
    explicit: Option<&Path>,
    selected_runtime: &Path,
) -> ExportResult<PathBuf> {
    if let Some(explicit) = explicit {
        return existing_path(explicit);
    }

    let sibling = selected_runtime.with_file_name(search.file_name("javac"));
    if sibling.exists() {
        return canonical(&sibling);
    }

    debug!("No javac next to {:?}; searching", selected_runtime);
    let candidates = discover(search, None, "javac")?;
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ExportError::ExecutableNotFound {
            binary: "javac".to_string(),
        })
}

fn existing_path(path: &Path) -> ExportResult<PathBuf> {
    if !path.exists() {
        return Err(ExportError::ExplicitPathNotFound(path.to_path_buf()));
    }
    canonical(path)
}

fn canonical(path: &Path) -> ExportResult<PathBuf> {
    dunce::canonicalize(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve, drop missing paths, and keep the first occurrence of each identity.
fn unique_existing(search: &JavaSearch, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for path in paths {
        let Ok(resolved) = dunce::canonicalize(&path) else {
            continue;
        };
        if seen.insert(search.identity_key(&resolved)) {
            out.push(resolved);
        }
    }

    out
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn exe_suffix() -> &'static str {
    if cfg!(windows) {
        ".exe"
    } else {
        ""
    }
}
