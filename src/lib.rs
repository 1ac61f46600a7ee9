mod commands;
pub mod core;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use crate::commands::{export_entity_models, ExportArgs};
use crate::core::config::ExportConfig;

/// Parse the command line, run the export pipeline and map the outcome to an
/// exit status.
pub async fn run() -> ExitCode {
    // Initialize structured logging; stdout is reserved for the progress lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,entity_export_lib=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = ExportArgs::parse();
    let config = ExportConfig::from_env();
    tracing::debug!(
        "Platform os={} arch={} version={:?}",
        config.platform.os,
        config.platform.arch,
        config.platform.version
    );

    match export_entity_models(args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
