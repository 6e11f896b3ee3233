//! Configuration for the Corona sun viewer.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line via clap, and can be re-read at runtime to pick up edits.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, CoronaLayerConfig, DebugConfig, LoopConfig, RenderConfig, SunConfig, WindowConfig,
    default_config_dir, hex_to_rgb,
};
pub use error::ConfigError;
