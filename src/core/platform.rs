// ─── Platform ───
// The OS/arch/version triple that manifest rules are evaluated against.

use std::fmt;

/// Mojang OS names understood by library rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsName {
    Windows,
    Osx,
    Linux,
}

impl OsName {
    /// OS name of the compile target.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsName::Windows
        } else if cfg!(target_os = "macos") {
            OsName::Osx
        } else {
            OsName::Linux
        }
    }

    /// Name as it appears in a rule's `os.name`.
    pub fn manifest_name(self) -> &'static str {
        match self {
            OsName::Windows => "windows",
            OsName::Osx => "osx",
            OsName::Linux => "linux",
        }
    }

    /// Path fragment that marks this platform's native-library jars,
    /// e.g. `lwjgl-3.3.3-natives-windows.jar`.
    pub fn native_marker(self) -> &'static str {
        match self {
            OsName::Windows => "-natives-windows",
            OsName::Osx => "-natives-macos",
            OsName::Linux => "-natives-linux",
        }
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPlatform {
    pub os: OsName,
    /// Lower-cased architecture, e.g. `x86_64` or `aarch64`.
    pub arch: String,
    pub version: String,
}

impl CurrentPlatform {
    pub fn new(os: OsName, arch: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into().to_ascii_lowercase(),
            version: version.into(),
        }
    }

    /// Reads the running machine. Called once at startup.
    pub fn detect() -> Self {
        let os = OsName::current();
        let dotted = match os {
            OsName::Windows => windows_dotted_version(sysinfo::System::kernel_version()),
            _ => None,
        };
        let version = dotted
            .or_else(sysinfo::System::os_version)
            .or_else(sysinfo::System::kernel_version)
            .unwrap_or_default();
        Self::new(os, std::env::consts::ARCH, version)
    }

    pub fn is_64bit(&self) -> bool {
        self.arch.contains("64")
    }
}

/// `10.0.<build>` from the Windows build number, the form `os.version`
/// patterns such as `^10\.` are written against. Builds older than Windows 10
/// are left to the caller's fallback.
fn windows_dotted_version(build: Option<String>) -> Option<String> {
    let build: u32 = build?.trim().parse().ok()?;
    (build >= 10240).then(|| format!("10.0.{}", build))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_is_normalized_to_lowercase() {
        let platform = CurrentPlatform::new(OsName::Windows, "AMD64", "10.0.19045");
        assert_eq!(platform.arch, "amd64");
        assert!(platform.is_64bit());
    }

    #[test]
    fn thirty_two_bit_arch_has_no_64_marker() {
        let platform = CurrentPlatform::new(OsName::Linux, "x86", "6.1");
        assert!(!platform.is_64bit());
    }

    #[test]
    fn native_markers_follow_mojang_naming() {
        assert_eq!(OsName::Osx.manifest_name(), "osx");
        assert_eq!(OsName::Osx.native_marker(), "-natives-macos");
        assert_eq!(OsName::Windows.native_marker(), "-natives-windows");
    }

    #[test]
    fn windows_build_number_becomes_dotted_version() {
        assert_eq!(
            windows_dotted_version(Some("22631".into())).as_deref(),
            Some("10.0.22631")
        );
        assert_eq!(
            windows_dotted_version(Some("19045".into())).as_deref(),
            Some("10.0.19045")
        );
        assert_eq!(windows_dotted_version(Some("9600".into())), None);
        assert_eq!(windows_dotted_version(Some("11 (22631)".into())), None);
        assert_eq!(windows_dotted_version(None), None);
    }
}
