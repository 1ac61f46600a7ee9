use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};

use crate::core::config::ExportConfig;
use crate::core::error::{ExportError, ExportResult};
use crate::core::inputs::detect_inputs;
use crate::core::java;
use crate::core::launch::{self, ExporterOptions};
use crate::core::version::DependencyManifest;

/// Compile and run EntityLayerObjExporter.java with auto-detected inputs.
#[derive(Debug, Parser)]
#[command(name = "entity-export", version)]
pub struct ExportArgs {
    /// Folder to auto-scan for client jar/json.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
    /// Path to client .jar. If omitted, auto-detected.
    #[arg(long)]
    pub client_jar: Option<PathBuf>,
    /// Path to version .json. If omitted, auto-detected.
    #[arg(long)]
    pub version_json: Option<PathBuf>,
    /// Minecraft libraries root. Defaults to the launcher's `.minecraft/libraries`.
    #[arg(long)]
    pub libraries_dir: Option<PathBuf>,
    /// Export output directory. Defaults to `<project-root>/exports/entity-models`.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Compiled exporter classes. Defaults to `<project-root>/build/entity-exporter`.
    #[arg(long)]
    pub build_dir: Option<PathBuf>,
    /// Exporter source. Defaults to `<project-root>/EntityLayerObjExporter.java`.
    #[arg(long)]
    pub exporter_source: Option<PathBuf>,
    /// Path to java executable.
    #[arg(long)]
    pub java_bin: Option<PathBuf>,
    /// Path to javac executable.
    #[arg(long)]
    pub javac_bin: Option<PathBuf>,

    /// Disable runtime orientation fix.
    #[arg(long)]
    pub no_runtime_orientation: bool,
    /// Disable Y-lift to grid (minY=0).
    #[arg(long)]
    pub no_lift_to_grid: bool,
    /// Disable V flip for OBJ UVs.
    #[arg(long)]
    pub no_flip_v: bool,
    /// Mirror Z axis.
    #[arg(long)]
    pub flip_z: bool,
    /// Export every cube as its own object.
    #[arg(long)]
    pub split_cubes: bool,
    /// Global scale multiplier.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

/// Full pipeline: detect inputs, pick a toolchain, resolve the classpath,
/// compile the exporter and run it.
pub async fn export_entity_models(args: ExportArgs, config: &ExportConfig) -> ExportResult<()> {
    let project_root = absolute(&args.project_root);
    let exporter_source = args
        .exporter_source
        .clone()
        .unwrap_or_else(|| project_root.join("EntityLayerObjExporter.java"));
    if !exporter_source.exists() {
        return Err(ExportError::InputNotFound {
            what: "Exporter source",
            path: exporter_source,
        });
    }
    if !project_root.exists() {
        return Err(ExportError::InputNotFound {
            what: "Project root",
            path: project_root,
        });
    }

    let inputs = detect_inputs(
        &project_root,
        args.client_jar.as_deref(),
        args.version_json.as_deref(),
    )?;
    let manifest = DependencyManifest::load(&inputs.version_json)?;
    let required_major = manifest.required_java_major();

    let runtime =
        java::select_runtime(&config.java_search, required_major, args.java_bin.as_deref())?;
    let javac = java::select_companion(
        &config.java_search,
        args.javac_bin.as_deref(),
        &runtime.path,
    )?;

    let libraries_dir = absolute(
        args.libraries_dir
            .as_deref()
            .unwrap_or(config.default_libraries_dir.as_path()),
    );
    if !libraries_dir.exists() {
        return Err(ExportError::InputNotFound {
            what: "Libraries directory",
            path: libraries_dir,
        });
    }

    let report = launch::resolve_classpath(
        &manifest,
        &libraries_dir,
        &inputs.client_jar,
        &config.platform,
    );
    if report.library_count() == 0 {
        return Err(ExportError::EmptyClasspath {
            manifest: inputs.version_json,
        });
    }
    info!(
        "Resolved {} libraries ({} missing)",
        report.library_count(),
        report.missing()
    );

    let output_dir = absolute(
        &args
            .output_dir
            .clone()
            .unwrap_or_else(|| project_root.join("exports").join("entity-models")),
    );
    let build_dir = args
        .build_dir
        .clone()
        .unwrap_or_else(|| project_root.join("build").join("entity-exporter"));
    create_dir(&build_dir)?;
    create_dir(&output_dir)?;

    println!("Using client jar: {}", inputs.client_jar.display());
    println!("Using version json: {}", inputs.version_json.display());
    println!("Using java ({}): {}", runtime.major, runtime.path.display());
    println!("Using javac: {}", javac.display());
    println!("Compiling exporter...");
    launch::compile_exporter(&javac, &exporter_source, &build_dir).await?;

    let classpath = launch::join_classpath(&build_dir, &report);
    let options = ExporterOptions {
        client_jar: inputs.client_jar.clone(),
        output_dir: output_dir.clone(),
        runtime_orientation: !args.no_runtime_orientation,
        lift_to_grid: !args.no_lift_to_grid,
        flip_v: !args.no_flip_v,
        flip_z: args.flip_z,
        split_cubes: args.split_cubes,
        scale: args.scale,
    };

    println!("Running exporter...");
    launch::run_exporter(&runtime.path, &launch::exporter_args(&classpath, &options)).await?;

    if report.missing() > 0 {
        warn!(
            "{} library jars were missing. Some models may have failed to export.",
            report.missing()
        );
    }

    println!("Export complete: {}", output_dir.display());
    Ok(())
}

fn create_dir(path: &Path) -> ExportResult<()> {
    std::fs::create_dir_all(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Canonical form when the path exists, otherwise joined onto the working directory.
fn absolute(path: &Path) -> PathBuf {
    dunce::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::java::JavaSearch;
    use crate::core::platform::{CurrentPlatform, OsName};

    fn config(libraries_dir: &Path) -> ExportConfig {
        ExportConfig {
            java_search: JavaSearch::default(),
            platform: CurrentPlatform::new(OsName::Linux, "x86_64", "6.5.0"),
            default_libraries_dir: libraries_dir.to_path_buf(),
        }
    }

    #[test]
    fn defaults_match_exporter_expectations() {
        let args = ExportArgs::parse_from(["entity-export"]);
        assert_eq!(args.project_root, PathBuf::from("."));
        assert_eq!(args.scale, 1.0);
        assert!(!args.no_flip_v);
        assert!(!args.flip_z);
        assert!(args.java_bin.is_none());
    }

    #[test]
    fn flags_parse() {
        let args = ExportArgs::parse_from([
            "entity-export",
            "--client-jar",
            "1.21.jar",
            "--no-runtime-orientation",
            "--flip-z",
            "--scale",
            "0.0625",
        ]);
        assert_eq!(args.client_jar, Some(PathBuf::from("1.21.jar")));
        assert!(args.no_runtime_orientation);
        assert!(args.flip_z);
        assert_eq!(args.scale, 0.0625);
    }

    #[tokio::test]
    async fn missing_exporter_source_is_reported_first() {
        let dir = tempfile::tempdir().unwrap();
        let args = ExportArgs::parse_from([
            "entity-export",
            "--project-root",
            dir.path().to_str().unwrap(),
        ]);
        let err = export_entity_models(args, &config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::InputNotFound {
                what: "Exporter source",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_manifest_aborts_before_toolchain_search() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("EntityLayerObjExporter.java"), b"class X {}").unwrap();
        std::fs::write(dir.path().join("1.21.jar"), b"jar").unwrap();
        std::fs::write(dir.path().join("1.21.json"), b"{ broken").unwrap();

        let args = ExportArgs::parse_from([
            "entity-export",
            "--project-root",
            dir.path().to_str().unwrap(),
        ]);
        let err = export_entity_models(args, &config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ManifestParse { .. }));
    }

    #[tokio::test]
    async fn no_runtime_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("EntityLayerObjExporter.java"), b"class X {}").unwrap();
        std::fs::write(dir.path().join("1.21.jar"), b"jar").unwrap();
        std::fs::write(dir.path().join("1.21.json"), br#"{"libraries":[]}"#).unwrap();

        let args = ExportArgs::parse_from([
            "entity-export",
            "--project-root",
            dir.path().to_str().unwrap(),
        ]);
        let err = export_entity_models(args, &config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ExecutableNotFound { .. }));
    }

    #[cfg(unix)]
    fn script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    #[cfg(unix)]
    fn fake_project(java_banner: &str) -> (tempfile::TempDir, ExportConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("EntityLayerObjExporter.java"), b"class X {}").unwrap();
        std::fs::write(root.join("1.21.jar"), b"jar").unwrap();
        std::fs::write(
            root.join("1.21.json"),
            serde_json::json!({
                "javaVersion": { "majorVersion": 21 },
                "libraries": [
                    { "downloads": { "artifact": { "path": "org/x/x-1.0.jar" } } },
                    { "downloads": { "artifact": { "path": "org/y/y-1.0.jar" } } }
                ]
            })
            .to_string(),
        )
        .unwrap();
        let libs = root.join("libraries");
        std::fs::create_dir_all(libs.join("org").join("x")).unwrap();
        std::fs::write(libs.join("org").join("x").join("x-1.0.jar"), b"x").unwrap();

        let bin = root.join("jdk").join("bin");
        script(
            &bin.join("java"),
            &format!(
                "if [ \"$1\" = \"-version\" ]; then echo '{}' >&2; exit 0; fi\necho \"$@\" > \"$(dirname \"$0\")/run-args\"",
                java_banner
            ),
        );
        script(&bin.join("javac"), "exit 0");

        let mut config = config(&libs);
        config.java_search.path_entries = vec![bin];
        (dir, config)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn full_pipeline_runs_exporter_with_resolved_classpath() {
        let (dir, config) = fake_project(r#"openjdk version "21.0.2" 2024-01-16"#);
        let args = ExportArgs::parse_from([
            "entity-export",
            "--project-root",
            dir.path().to_str().unwrap(),
        ]);

        export_entity_models(args, &config).await.unwrap();

        let run_args =
            std::fs::read_to_string(dir.path().join("jdk").join("bin").join("run-args")).unwrap();
        assert!(run_args.contains("EntityLayerObjExporter"));
        assert!(run_args.contains("x-1.0.jar"));
        assert!(!run_args.contains("y-1.0.jar"));
        assert!(dir.path().join("exports").join("entity-models").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn old_runtime_is_version_too_low() {
        let (dir, config) = fake_project(r#"openjdk version "17.0.9" 2023-10-17"#);
        let args = ExportArgs::parse_from([
            "entity-export",
            "--project-root",
            dir.path().to_str().unwrap(),
        ]);

        let err = export_entity_models(args, &config).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::VersionTooLow {
                required: 21,
                found: 17,
                ..
            }
        ));
    }
}
