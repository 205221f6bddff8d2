//! Run configuration: built-in defaults, an optional TOML file, `-S`
//! overrides and command-line arguments, merged in that order of increasing
//! precedence.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::{build_generate_config, build_load_config};
pub use models::{GenerateConfig, LoadConfig, StructureConfig};
