// ─── Configuration ───
// Environment-derived defaults, read once at startup and passed down.

use std::path::{Path, PathBuf};

use crate::core::java::JavaSearch;
use crate::core::platform::CurrentPlatform;

const MINECRAFT_DIR_NAME: &str = ".minecraft";

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub java_search: JavaSearch,
    pub platform: CurrentPlatform,
    pub default_libraries_dir: PathBuf,
}

impl ExportConfig {
    pub fn from_env() -> Self {
        let appdata = std::env::var_os("APPDATA")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            java_search: JavaSearch::from_env(),
            platform: CurrentPlatform::detect(),
            default_libraries_dir: default_libraries_dir(appdata.as_deref(), dirs::home_dir()),
        }
    }
}

/// `%APPDATA%/.minecraft/libraries` when set, else `<home>/.minecraft/libraries`.
pub fn default_libraries_dir(appdata: Option<&Path>, home: Option<PathBuf>) -> PathBuf {
    let base = match appdata {
        Some(appdata) => appdata.to_path_buf(),
        None => home.unwrap_or_else(|| PathBuf::from(".")),
    };
    base.join(MINECRAFT_DIR_NAME).join("libraries")
}
