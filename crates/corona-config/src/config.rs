//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";
const APP_NAME: &str = "corona";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera and frame settings.
    pub render: RenderConfig,
    /// Sun, corona, loop and halo parameters.
    pub sun: SunConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera and frame configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Background color, display-referred RGB.
    pub clear_color: [f32; 3],
    /// Distance from the camera to the sun center.
    pub camera_distance: f32,
    /// Camera elevation above the sun's equator, in degrees.
    pub camera_elevation_deg: f32,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
}

/// One translucent corona shell. Missing fields take the innermost shell's
/// values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoronaLayerConfig {
    /// Shell radius.
    pub radius: f32,
    /// Color near the limb, as `0xRRGGBB`.
    pub color_inner: u32,
    /// Color facing the viewer, as `0xRRGGBB`.
    pub color_outer: u32,
    /// Alpha multiplier for the shell.
    pub intensity: f32,
}

/// Coronal loop generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoopConfig {
    /// Number of loops scattered over the surface.
    pub count: u32,
    /// Path segments per loop (the path has `segments + 1` control points).
    pub segments: u32,
    /// Tube radius.
    pub tube_radius: f32,
    /// Tube cross-section segments.
    pub radial_segments: u32,
    /// Minimum arc height.
    pub height_min: f32,
    /// Random extra arc height, `[0, height_span)`.
    pub height_span: f32,
    /// Minimum arc half-width.
    pub width_min: f32,
    /// Random extra arc half-width, `[0, width_span)`.
    pub width_span: f32,
    /// Upper bound of the per-loop shader seed.
    pub seed_range: f32,
}

/// Sun effect parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SunConfig {
    /// Photosphere radius. Loops are anchored on this sphere.
    pub radius: f32,
    /// Width and height segments of the photosphere sphere.
    pub segments: u32,
    /// Width and height segments of each corona shell.
    pub corona_segments: u32,
    /// Corona shells, innermost first.
    pub corona_layers: Vec<CoronaLayerConfig>,
    /// Coronal loop parameters.
    pub loops: LoopConfig,
    /// Heat halo radius.
    pub halo_radius: f32,
    /// Width and height segments of the halo sphere.
    pub halo_segments: u32,
    /// Y rotation added to the sun on every update.
    pub spin_per_update: f32,
    /// Y rotation added to every secondary layer on every update.
    pub layer_drift_per_update: f32,
    /// Initial brightness scalar.
    pub exposure: f32,
    /// Seed for loop placement. `None` draws one from the OS.
    pub seed: Option<u64>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter directive (e.g., "debug", "info,wgpu=warn"). Empty uses the
    /// logger's default filter.
    pub log_level: String,
    /// Seconds between config file re-reads. 0 disables hot reload.
    pub reload_interval_secs: f32,
    /// Frames to render before capturing a requested screenshot.
    pub screenshot_after_frames: u32,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Corona".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.01],
            camera_distance: 48.0,
            camera_elevation_deg: 10.0,
            fov_y_deg: 45.0,
        }
    }
}

impl Default for CoronaLayerConfig {
    fn default() -> Self {
        Self {
            radius: 12.3,
            color_inner: 0xffd966,
            color_outer: 0xff9933,
            intensity: 0.35,
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            count: 35,
            segments: 32,
            tube_radius: 0.02,
            radial_segments: 8,
            height_min: 0.8,
            height_span: 1.5,
            width_min: 0.6,
            width_span: 1.2,
            seed_range: 1000.0,
        }
    }
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            radius: 12.0,
            segments: 96,
            corona_segments: 64,
            corona_layers: vec![
                CoronaLayerConfig::default(),
                CoronaLayerConfig {
                    radius: 12.7,
                    color_inner: 0xff9933,
                    color_outer: 0xff6600,
                    intensity: 0.25,
                },
                CoronaLayerConfig {
                    radius: 13.0,
                    color_inner: 0xff6600,
                    color_outer: 0xff4400,
                    intensity: 0.15,
                },
            ],
            loops: LoopConfig::default(),
            halo_radius: 12.5,
            halo_segments: 64,
            spin_per_update: 0.001,
            layer_drift_per_update: 0.0006,
            exposure: 1.0,
            seed: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: String::new(),
            reload_interval_secs: 2.0,
            screenshot_after_frames: 120,
        }
    }
}

/// Split a `0xRRGGBB` value into display-referred RGB in `[0, 1]`.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// The platform config directory for the viewer, e.g. `~/.config/corona`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
