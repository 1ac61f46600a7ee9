pub mod runtime;

pub use runtime::discover;
pub use runtime::parse_java_major;
pub use runtime::probe_version;
pub use runtime::select_companion;
pub use runtime::select_runtime;
pub use runtime::JavaSearch;
pub use runtime::SelectedRuntime;
