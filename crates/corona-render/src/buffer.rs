//! Vertex and index buffers for layer meshes.

use bytemuck::{Pod, Zeroable};
use corona_mesh::Geometry;
use wgpu::util::DeviceExt;

/// Vertex format shared by every layer program.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LayerVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl LayerVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LayerVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleave a geometry's attributes.
    pub fn from_geometry(geometry: &Geometry) -> Vec<LayerVertex> {
        geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .zip(&geometry.uvs)
            .map(|((position, normal), uv)| LayerVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: *uv,
            })
            .collect()
    }
}

/// A mesh uploaded to the GPU.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind the buffers and draw every index.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Creates GPU buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload a geometry as interleaved [`LayerVertex`] data with `u32` indices.
    pub fn create_mesh(&self, label: &str, geometry: &Geometry) -> MeshBuffer {
        let vertices = LayerVertex::from_geometry(geometry);
        let vertex_buffer = self.create_buffer(
            &format!("{label}-vertices"),
            bytemuck::cast_slice(&vertices),
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = self.create_buffer(
            &format!("{label}-indices"),
            bytemuck::cast_slice(&geometry.indices),
            wgpu::BufferUsages::INDEX,
        );

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }

    /// A uniform buffer initialized with `contents`, writable every frame.
    pub fn create_uniform_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.create_buffer(label, contents, wgpu::BufferUsages::UNIFORM)
    }

    fn create_buffer(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
    }
}
