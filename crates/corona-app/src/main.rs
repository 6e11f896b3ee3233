//! `corona`: an animated procedural sun in a window.

use clap::Parser;
use corona_app::platform::AppDirs;
use corona_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let cli = CliArgs::parse();

    let dirs = match AppDirs::resolve(cli.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            std::process::exit(1);
        }
    };

    let (file_config, load_error) = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config = corona_app::window::effective_config(&file_config, &cli);

    corona_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = load_error {
        error!("Using default config: {e}");
    }
    info!("Config directory: {}", dirs.config_dir.display());

    if let Err(e) = corona_app::run(file_config, cli, dirs) {
        error!("Corona exited with an error: {e}");
        std::process::exit(1);
    }
}
