//! Where the viewer keeps its files.

use std::path::{Path, PathBuf};

use corona_config::{ConfigError, default_config_dir};

const APP_NAME: &str = "corona";

/// Directories the viewer reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Debug-build JSON logs.
    pub log_dir: PathBuf,
    /// `.wgsl` overrides for the layer programs.
    pub shader_dir: PathBuf,
}

impl AppDirs {
    /// Resolve the directories, using `config_override` instead of the
    /// platform config directory when given. Nothing is created on disk.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self, ConfigError> {
        let config_dir = match config_override {
            Some(dir) => dir.to_path_buf(),
            None => default_config_dir()?,
        };
        let log_dir = dirs::data_local_dir()
            .map(|dir| dir.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| config_dir.join("logs"));

        Ok(Self::with_log_dir(config_dir, log_dir))
    }

    /// Shaders live next to the config file.
    pub fn with_log_dir(config_dir: PathBuf, log_dir: PathBuf) -> Self {
        Self {
            shader_dir: config_dir.join("shaders"),
            config_dir,
            log_dir,
        }
    }
}
