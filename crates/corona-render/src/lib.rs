//! wgpu host for the sun layers: device and surface setup, the four WGSL
//! programs, and a renderer that draws a [`corona_scene::SceneGraph`].

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod layer_pipeline;
pub mod pass;
pub mod scene_renderer;
pub mod shader;

#[cfg(test)]
mod test_device;

pub use buffer::{BufferAllocator, LayerVertex, MeshBuffer};
pub use camera::{Camera, CameraUniform};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use layer_pipeline::{LayerPipelines, LayerUniform, PipelineKey};
pub use pass::{FrameEncoder, RenderPassBuilder, Screenshot};
pub use scene_renderer::SceneRenderer;
pub use shader::{ShaderError, ShaderLibrary, builtin_source};
