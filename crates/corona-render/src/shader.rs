//! Shader module loading and caching.
//!
//! The four layer programs are embedded with `include_str!`. A library can
//! also be pointed at a directory of `.wgsl` files, in which case a file named
//! after the program overrides the embedded source. The library remembers the
//! modification time of each override so edited, added or removed files can
//! be picked up while the viewer runs.

use log::{debug, info};
use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use corona_scene::ShaderProgram;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("no shader directory configured for file-based loading")]
    NoShaderDir,
}

/// Embedded WGSL for a layer program.
pub fn builtin_source(program: ShaderProgram) -> &'static str {
    match program {
        ShaderProgram::Photosphere => include_str!("shaders/photosphere.wgsl"),
        ShaderProgram::Corona => include_str!("shaders/corona.wgsl"),
        ShaderProgram::CoronalLoop => include_str!("shaders/coronal_loop.wgsl"),
        ShaderProgram::HeatHalo => include_str!("shaders/heat_halo.wgsl"),
    }
}

/// Named cache of compiled shader modules.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    /// Override modification time each program was compiled from, `None`
    /// for the embedded source.
    stamps: HashMap<ShaderProgram, Option<SystemTime>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<name>.wgsl` overrides from `dir`.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    pub fn shader_dir(&self) -> Option<&PathBuf> {
        self.shader_dir.as_ref()
    }

    /// Compile `source` and cache it under `name`, replacing any previous module.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Compiling shader '{name}'");
        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        if self.modules.insert(name.to_string(), module.clone()).is_some() {
            info!("Replaced shader '{name}'");
        } else {
            info!("Loaded shader '{name}'");
        }
        module
    }

    /// Compile a layer program, preferring a file override when present.
    pub fn load_program(
        &mut self,
        device: &wgpu::Device,
        program: ShaderProgram,
    ) -> Arc<wgpu::ShaderModule> {
        let name = program.name();
        self.stamps.insert(program, self.override_modified(name));
        match self.read_file(name) {
            Ok(source) => self.load_from_source(device, name, &source),
            Err(ShaderError::NoShaderDir | ShaderError::FileNotFound { .. }) => {
                self.load_from_source(device, name, builtin_source(program))
            }
            Err(e) => {
                log::warn!("Falling back to embedded '{name}' shader: {e}");
                self.load_from_source(device, name, builtin_source(program))
            }
        }
    }

    /// Loaded programs whose override file changed, appeared or disappeared
    /// since they were compiled.
    pub fn stale_programs(&self) -> Vec<ShaderProgram> {
        ShaderProgram::ALL
            .into_iter()
            .filter(|program| {
                self.stamps
                    .get(program)
                    .is_some_and(|stamp| *stamp != self.override_modified(program.name()))
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn override_modified(&self, name: &str) -> Option<SystemTime> {
        let path = self.shader_dir.as_ref()?.join(format!("{name}.wgsl"));
        std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }

    fn read_file(&self, name: &str) -> Result<String, ShaderError> {
        let dir = self.shader_dir.as_ref().ok_or(ShaderError::NoShaderDir)?;
        let path = dir.join(format!("{name}.wgsl"));
        if !path.exists() {
            return Err(ShaderError::FileNotFound { path });
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}
