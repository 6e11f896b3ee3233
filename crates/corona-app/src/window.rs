//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it opens the window
//! on `resumed`, builds the sun into its scene, steps the animation at a fixed
//! rate and draws a frame on every redraw.

use std::path::PathBuf;
use std::sync::Arc;

use corona_config::{CliArgs, Config, RenderConfig};
use corona_effects::SunEffects;
use corona_render::{
    Camera, FrameEncoder, RenderContext, RenderContextError, RenderPassBuilder, SceneRenderer,
    ShaderLibrary, SurfaceError, init_render_context_blocking,
};
use corona_scene::{NodeId, SceneError, SceneGraph};
use glam::Vec3;
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::game_loop::GameLoop;
use crate::platform::AppDirs;
use crate::screenshot::{ScreenshotError, save_png};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("failed to build the sun: {0}")]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Screenshot(#[from] ScreenshotError),

    #[error("could not read back the rendered frame")]
    Readback,
}

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
}

/// The config file's settings with the command line applied on top.
pub fn effective_config(file_config: &Config, cli: &CliArgs) -> Config {
    let mut config = file_config.clone();
    config.apply_cli_overrides(cli);
    config
}

/// Camera orbiting the origin as the render settings describe.
pub fn camera_from_config(render: &RenderConfig, width: u32, height: u32) -> Camera {
    let mut camera = Camera::orbiting(
        Vec3::ZERO,
        render.camera_distance,
        render.camera_elevation_deg.to_radians(),
        render.fov_y_deg.to_radians(),
    );
    camera.set_aspect_ratio(width as f32, height as f32);
    camera
}

pub fn clear_color(render: &RenderConfig) -> wgpu::Color {
    let [r, g, b] = render.clear_color;
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: 1.0,
    }
}

pub struct AppState {
    /// As read from `config.ron`, for change detection on reload.
    file_config: Config,
    config: Config,
    cli: CliArgs,
    dirs: AppDirs,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    queue: Option<Arc<wgpu::Queue>>,
    renderer: Option<SceneRenderer>,
    scene: SceneGraph,
    effects: SunEffects,
    camera: Camera,
    game_loop: GameLoop,
    since_reload: f64,
    failure: Option<AppError>,
}

impl AppState {
    pub fn new(file_config: Config, cli: CliArgs, dirs: AppDirs) -> Self {
        let config = effective_config(&file_config, &cli);
        let camera = camera_from_config(&config.render, config.window.width, config.window.height);
        Self {
            effects: SunEffects::new(config.sun.clone()),
            camera,
            file_config,
            config,
            cli,
            dirs,
            window: None,
            gpu: None,
            queue: None,
            renderer: None,
            scene: SceneGraph::new(),
            game_loop: GameLoop::new(),
            since_reload: 0.0,
            failure: None,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn effects(&self) -> &SunEffects {
        &self.effects
    }

    /// Add the sun layers to the scene at the configured exposure. Returns the
    /// existing sun when called again.
    pub fn build_scene(&mut self) -> Result<NodeId, SceneError> {
        if let Some(sun) = self.effects.sun() {
            return Ok(sun);
        }
        let sun = self.effects.init_sun_effects(&mut self.scene)?;
        self.effects.set_exposure(&mut self.scene, self.config.sun.exposure);
        Ok(sun)
    }

    /// One fixed simulation step ending at `total_time` seconds.
    pub fn step(&mut self, dt: f64, total_time: f64) {
        self.effects.update(&mut self.scene, total_time as f32);
        self.since_reload += dt;
    }

    /// Push live-editable settings from a re-read config file.
    pub fn apply_config(&mut self, file_config: &Config) {
        let config = effective_config(file_config, &self.cli);
        if config.sun.exposure != self.effects.exposure() {
            info!("Exposure changed to {}", config.sun.exposure);
            self.effects.set_exposure(&mut self.scene, config.sun.exposure);
        }
        let mut pending = config.sun.clone();
        pending.exposure = self.config.sun.exposure;
        if pending != self.config.sun {
            info!("Sun geometry settings apply on next start");
        }
        self.config.render.clear_color = config.render.clear_color;
        self.config.sun.exposure = config.sun.exposure;
        self.config.debug.reload_interval_secs = config.debug.reload_interval_secs;
    }

    fn reload_if_due(&mut self) {
        let interval = f64::from(self.config.debug.reload_interval_secs);
        if interval <= 0.0 || self.since_reload < interval {
            return;
        }
        self.since_reload = 0.0;

        match self.file_config.reload(&self.dirs.config_dir) {
            Ok(Some(file_config)) => {
                self.apply_config(&file_config);
                self.file_config = file_config;
            }
            Ok(None) => {}
            Err(e) => warn!("Config reload failed: {e}"),
        }

        if let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) {
            let reloaded = renderer.reload_shaders(&gpu.device);
            if !reloaded.is_empty() {
                info!("Reloaded shaders: {reloaded:?}");
            }
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let (width, height) = gpu.size();
        info!(
            "Surface {}x{} ({:?}), adapter {}",
            width,
            height,
            gpu.surface_format,
            gpu.adapter.get_info().name
        );

        let shaders = ShaderLibrary::new().with_shader_dir(self.dirs.shader_dir.clone());
        self.renderer = Some(SceneRenderer::new(
            &gpu.device,
            gpu.surface_format,
            width,
            height,
            shaders,
        ));
        self.queue = Some(Arc::new(gpu.queue.clone()));
        self.camera.set_aspect_ratio(width as f32, height as f32);
        self.build_scene()?;

        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
        self.camera.set_aspect_ratio(width as f32, height as f32);
        info!("Window resized to {width}x{height}");
    }

    fn screenshot_due(&self) -> Option<PathBuf> {
        let path = self.cli.screenshot.as_ref()?;
        (self.game_loop.frame_count() >= u64::from(self.config.debug.screenshot_after_frames))
            .then(|| path.clone())
    }

    /// Draw one frame. Returns whether the app should exit.
    fn render_frame(&mut self) -> Result<bool, AppError> {
        let screenshot = self.screenshot_due();
        let (Some(gpu), Some(renderer), Some(queue)) =
            (&mut self.gpu, &mut self.renderer, &self.queue)
        else {
            return Ok(false);
        };

        renderer.prepare(&gpu.device, &gpu.queue, &self.scene, &self.camera);

        let surface_texture = match gpu.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Lost) => {
                let (width, height) = gpu.size();
                gpu.resize(width, height);
                return Ok(false);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                return Ok(true);
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                return Ok(false);
            }
        };

        let mut frame_encoder = FrameEncoder::new(&gpu.device, queue.clone(), surface_texture);
        let pass_builder = RenderPassBuilder::new()
            .clear_color(clear_color(&self.config.render))
            .depth(renderer.depth_view().clone())
            .label("sun-pass");
        if let Some(mut pass) = frame_encoder.begin_render_pass(&pass_builder) {
            renderer.render(&mut pass);
        }

        let Some(path) = screenshot else {
            frame_encoder.submit();
            return Ok(false);
        };

        let capture = frame_encoder.copy_surface_to_buffer(&gpu.device);
        frame_encoder.submit();
        let capture = capture.ok_or(AppError::Readback)?;
        let (width, height) = (capture.width, capture.height);
        let rgba = capture
            .read_rgba(&gpu.device)
            .ok_or(AppError::Readback)?;
        save_png(&path, &rgba, width, height)?;
        info!("Saved screenshot to {}", path.display());
        Ok(true)
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let mut steps = Vec::new();
                self.game_loop
                    .tick(|dt, total| steps.push((dt, total)), |_alpha| {});
                for (dt, total) in steps {
                    self.step(dt, total);
                }
                self.reload_if_due();

                match self.render_frame() {
                    Ok(false) => {}
                    Ok(true) => {
                        event_loop.exit();
                        return;
                    }
                    Err(e) => {
                        self.fail(event_loop, e);
                        return;
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open the viewer and block until it exits.
#[instrument(skip_all)]
pub fn run(file_config: Config, cli: CliArgs, dirs: AppDirs) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(file_config, cli, dirs);
    event_loop.run_app(&mut app)?;
    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
