pub mod classpath;
pub mod task;

pub use classpath::{join_classpath, resolve_classpath, ResolutionReport};
pub use task::{compile_exporter, exporter_args, run_exporter, ExporterOptions};
