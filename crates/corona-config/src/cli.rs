//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Corona viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "corona", about = "Procedural animated sun viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial exposure (brightness scalar).
    #[arg(long)]
    pub exposure: Option<f32>,

    /// Seed for coronal loop placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of coronal loops.
    #[arg(long)]
    pub loops: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a PNG of the rendered frame to this path, then exit.
    #[arg(long)]
    pub screenshot: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(exposure) = args.exposure {
            self.sun.exposure = exposure;
        }
        if let Some(seed) = args.seed {
            self.sun.seed = Some(seed);
        }
        if let Some(loops) = args.loops {
            self.sun.loops.count = loops;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
