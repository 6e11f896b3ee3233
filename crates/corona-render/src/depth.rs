//! Depth target for the sun pass.
//!
//! The photosphere writes depth and the translucent shells only test
//! against it, so a shell behind the sphere is hidden while the shells
//! still blend over each other. Depth is reverse-Z to match
//! [`Camera::projection_matrix`](crate::camera::Camera::projection_matrix).

pub struct DepthBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// The far plane under reverse-Z.
    pub const CLEAR_VALUE: f32 = 0.0;

    /// Nearer fragments carry larger depth.
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    /// A buffer matching the surface. A minimized window reports 0x0, which
    /// is stored as 1x1.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = clamp_size(width, height);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sun-depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            size,
        }
    }

    /// Follow a surface resize. Returns whether a new texture was made.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if self.size == clamp_size(width, height) {
            return false;
        }
        *self = Self::new(device, width, height);
        true
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Load and store ops that reset the buffer at the start of a frame.
    pub fn clear_ops() -> wgpu::Operations<f32> {
        wgpu::Operations {
            load: wgpu::LoadOp::Clear(Self::CLEAR_VALUE),
            store: wgpu::StoreOp::Store,
        }
    }
}

fn clamp_size(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}
