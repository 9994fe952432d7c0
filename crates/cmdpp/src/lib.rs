// crates/cmdpp/src/lib.rs
pub mod config;
pub mod options;
pub mod pipeline;

pub use config::{ConfigError, FileConfig};
pub use options::{Args, Options};
pub use pipeline::{run, run_with_options, CliError};
