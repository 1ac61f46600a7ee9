pub mod manifest;
pub mod rules;

pub use manifest::{
    DependencyManifest, LibraryEntry, OsRule, PlatformRule, RuleAction, DEFAULT_JAVA_MAJOR,
};
