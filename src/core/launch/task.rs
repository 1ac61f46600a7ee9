// ─── Launch Task ───
// Compiles the exporter with javac and runs it with the resolved classpath.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::core::error::{ExportError, ExportResult};

/// Entry class of the exporter program.
pub const EXPORTER_MAIN_CLASS: &str = "EntityLayerObjExporter";

/// Flags forwarded to the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterOptions {
    pub client_jar: PathBuf,
    pub output_dir: PathBuf,
    pub runtime_orientation: bool,
    pub lift_to_grid: bool,
    pub flip_v: bool,
    pub flip_z: bool,
    pub split_cubes: bool,
    pub scale: f64,
}

/// `javac -encoding UTF-8 -d <build_dir> <source>`.
pub async fn compile_exporter(javac: &Path, source: &Path, build_dir: &Path) -> ExportResult<()> {
    let args: Vec<OsString> = vec![
        "-encoding".into(),
        "UTF-8".into(),
        "-d".into(),
        build_dir.into(),
        source.into(),
    ];
    run_tool("javac", javac, &args).await
}

/// Runs the exporter, inheriting stdio.
pub async fn run_exporter(java: &Path, args: &[OsString]) -> ExportResult<()> {
    run_tool("Exporter", java, args).await
}

/// Arguments for `java` when running the exporter.
pub fn exporter_args(classpath: &str, options: &ExporterOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-cp".into(),
        classpath.into(),
        EXPORTER_MAIN_CLASS.into(),
        "--client-jar".into(),
        options.client_jar.as_os_str().to_owned(),
        "--out".into(),
        options.output_dir.as_os_str().to_owned(),
    ];

    let flags = [
        ("--runtime-orientation", options.runtime_orientation),
        ("--lift-to-grid", options.lift_to_grid),
        ("--flip-v", options.flip_v),
        ("--flip-z", options.flip_z),
        ("--split-cubes", options.split_cubes),
    ];
    for (flag, value) in flags {
        args.push(flag.into());
        args.push(value.to_string().into());
    }

    args.push("--scale".into());
    args.push(format_scale(options.scale).into());
    args
}

/// `%.8g` rendering: up to 8 significant digits without trailing zeros
/// (`1`, `0.5`, `1.2345679`), exponent form outside `1e-4..1e8`.
pub fn format_scale(scale: f64) -> String {
    if scale == 0.0 || !scale.is_finite() {
        return format!("{}", scale);
    }

    let scientific = format!("{:.7e}", scale);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..8).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs());
    }

    let decimals = (7 - exponent).max(0) as usize;
    trim_fraction(&format!("{:.*}", decimals, scale))
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

async fn run_tool(tool: &'static str, program: &Path, args: &[OsString]) -> ExportResult<()> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    debug!("Command (copy/paste): {}", format_command_for_logs(program, args));
    info!("Running {} ({:?})", tool, program);

    let status = cmd.status().await.map_err(|source| ExportError::ToolSpawn {
        tool,
        path: program.to_path_buf(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(ExportError::ToolFailed {
            tool,
            code: status.code().unwrap_or(1),
        })
    }
}

fn format_command_for_logs(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| shell_escape(&part.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=' | ';')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
