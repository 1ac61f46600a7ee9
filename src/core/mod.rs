// ─── Entity Export Core ───
// Toolchain selection and manifest-driven classpath resolution for the
// entity model exporter.
//
// Architecture:
//   core/
//     java/      — Java runtime discovery, version probing, javac lookup
//     version/   — Version JSON model + OS rule evaluation
//     launch/    — Classpath resolver + compile/run steps
//     inputs     — Client jar / version json auto-detection
//     platform   — Current OS/arch/version descriptor
//     config     — Environment-derived defaults

pub mod config;
pub mod error;
pub mod inputs;
pub mod java;
pub mod launch;
pub mod platform;
pub mod version;
