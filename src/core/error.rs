use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the exporter front-end.
/// Every module returns `Result<T, ExportError>`.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Java toolchain ──────────────────────────────────
    #[error("No {binary} executable found. Pass --{binary}-bin.")]
    ExecutableNotFound { binary: String },

    #[error("Executable not found: {0:?}")]
    ExplicitPathNotFound(PathBuf),

    #[error("No usable {binary} executable found. Pass --{binary}-bin.")]
    NoUsableRuntime { binary: String },

    #[error("Unable to parse Java version from {path:?}: {detail}")]
    VersionParse { path: PathBuf, detail: String },

    #[error(
        "This Minecraft version requires Java {required}+; selected Java is {found} at {path:?}"
    )]
    VersionTooLow {
        path: PathBuf,
        required: u32,
        found: u32,
    },

    // ── Manifest ────────────────────────────────────────
    #[error("Failed to read version json {path:?}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ── Inputs ──────────────────────────────────────────
    #[error("{what} not found: {path:?}")]
    InputNotFound { what: &'static str, path: PathBuf },

    #[error("No {what} found. Put it in project root or pass --{flag}.")]
    InputNotDetected {
        what: &'static str,
        flag: &'static str,
    },

    // ── Classpath ───────────────────────────────────────
    #[error(
        "No libraries were resolved from version json {manifest:?}. Check --version-json and --libraries-dir."
    )]
    EmptyClasspath { manifest: PathBuf },

    // ── External tools ──────────────────────────────────
    #[error("{tool} failed with exit code {code}.")]
    ToolFailed { tool: &'static str, code: i32 },

    #[error("Failed to start {tool} at {path:?}: {source}")]
    ToolSpawn {
        tool: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type ExportResult<T> = Result<T, ExportError>;

impl ExportError {
    /// Process exit status for this failure. External tools keep their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::ToolFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}
