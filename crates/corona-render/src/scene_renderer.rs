//! Draws every mesh of a [`SceneGraph`].

use std::collections::HashMap;
use std::sync::Arc;

use corona_mesh::Geometry;
use corona_scene::{NodeId, SceneGraph, ShaderProgram};
use glam::Mat4;

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::camera::{Camera, CameraUniform};
use crate::depth::DepthBuffer;
use crate::layer_pipeline::{LayerPipelines, LayerUniform, PipelineKey};
use crate::shader::ShaderLibrary;

/// GPU state kept per mesh node.
struct NodeResources {
    geometry: Arc<Geometry>,
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

#[derive(Clone, Copy, Debug)]
struct DrawItem {
    node: NodeId,
    key: PipelineKey,
    /// Distance from the camera to the mesh origin.
    distance: f32,
}

/// Uploads scene meshes on first sight, refreshes their uniforms every frame
/// and draws opaque meshes before transparent ones.
pub struct SceneRenderer {
    pipelines: LayerPipelines,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth: DepthBuffer,
    nodes: HashMap<NodeId, NodeResources>,
    draw_list: Vec<DrawItem>,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        shaders: ShaderLibrary,
    ) -> Self {
        let pipelines = LayerPipelines::new(device, surface_format, shaders);
        let camera_buffer = BufferAllocator::new(device).create_uniform_buffer(
            "camera-uniform",
            bytemuck::bytes_of(&Camera::default().to_uniform()),
        );
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bind-group"),
            layout: pipelines.camera_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipelines,
            camera_buffer,
            camera_bind_group,
            depth: DepthBuffer::new(device, width, height),
            nodes: HashMap::new(),
            draw_list: Vec::new(),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        self.depth.view()
    }

    /// Meshes queued by the last [`prepare`](Self::prepare).
    pub fn draw_count(&self) -> usize {
        self.draw_list.len()
    }

    /// Mesh nodes with GPU buffers.
    pub fn uploaded_count(&self) -> usize {
        self.nodes.len()
    }

    /// Pick up edited `.wgsl` overrides. Returns the recompiled programs.
    pub fn reload_shaders(&mut self, device: &wgpu::Device) -> Vec<ShaderProgram> {
        self.pipelines.reload_shaders(device)
    }

    /// Upload anything new in `scene`, write this frame's uniforms and build
    /// the draw list.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
        camera: &Camera,
    ) {
        let camera_uniform: CameraUniform = camera.to_uniform();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

        self.draw_list.clear();
        for (id, mesh, world) in scene.meshes() {
            let uniform = LayerUniform::new(world, &mesh.material.uniforms);
            let stale = self
                .nodes
                .get(&id)
                .is_none_or(|res| !Arc::ptr_eq(&res.geometry, &mesh.geometry));

            if stale {
                let resources = self.upload(device, id, &mesh.geometry, &uniform);
                self.nodes.insert(id, resources);
            } else if let Some(res) = self.nodes.get(&id) {
                queue.write_buffer(&res.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
            }

            let key = PipelineKey::from_material(&mesh.material);
            self.pipelines.prepare(device, key);
            self.draw_list.push(DrawItem {
                node: id,
                key,
                distance: distance_to_camera(world, camera),
            });
        }

        sort_draw_list(&mut self.draw_list);
    }

    /// Record the draws queued by [`prepare`](Self::prepare).
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for item in &self.draw_list {
            let (Some(pipeline), Some(res)) =
                (self.pipelines.get(&item.key), self.nodes.get(&item.node))
            else {
                continue;
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &res.bind_group, &[]);
            res.mesh.draw(pass);
        }
    }

    fn upload(
        &self,
        device: &wgpu::Device,
        id: NodeId,
        geometry: &Arc<Geometry>,
        uniform: &LayerUniform,
    ) -> NodeResources {
        let allocator = BufferAllocator::new(device);
        let label = format!("node-{}", id.index());
        let mesh = allocator.create_mesh(&label, geometry);
        let uniform_buffer =
            allocator.create_uniform_buffer(&format!("{label}-uniform"), bytemuck::bytes_of(uniform));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: self.pipelines.layer_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        log::debug!(
            "Uploaded node {id}: {} vertices, {} triangles",
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        NodeResources {
            geometry: geometry.clone(),
            mesh,
            uniform_buffer,
            bind_group,
        }
    }
}

fn distance_to_camera(world: Mat4, camera: &Camera) -> f32 {
    world.w_axis.truncate().distance(camera.position)
}

/// Opaque meshes keep scene order; transparent ones follow, farthest first.
/// Ties keep scene order.
fn sort_draw_list(items: &mut [DrawItem]) {
    items.sort_by(|a, b| {
        a.key
            .transparent
            .cmp(&b.key.transparent)
            .then_with(|| {
                if a.key.transparent {
                    b.distance.total_cmp(&a.distance)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_device::create_test_device;
    use corona_mesh::sphere_geometry;
    use corona_scene::{LayerUniforms, Mesh, Node, ShaderMaterial, ShaderProgram, Side, Transform};
    use glam::Vec3;

    fn item(scene: &mut SceneGraph, transparent: bool, distance: f32) -> DrawItem {
        let node = scene.add(Node::group("g"));
        let material = if transparent {
            ShaderMaterial::additive(ShaderProgram::Corona, LayerUniforms::default(), Side::Back)
        } else {
            ShaderMaterial::opaque(ShaderProgram::Photosphere, LayerUniforms::default())
        };
        DrawItem {
            node,
            key: PipelineKey::from_material(&material),
            distance,
        }
    }

    #[test]
    fn test_opaque_first_then_transparent_back_to_front() {
        let mut scene = SceneGraph::new();
        let near_glow = item(&mut scene, true, 10.0);
        let sun = item(&mut scene, false, 48.0);
        let far_glow = item(&mut scene, true, 60.0);
        let tie = item(&mut scene, true, 10.0);

        let mut items = vec![near_glow, sun, far_glow, tie];
        sort_draw_list(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.node).collect();
        assert_eq!(order, vec![sun.node, far_glow.node, near_glow.node, tie.node]);
    }

    #[test]
    fn test_distance_uses_world_origin() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 48.0),
            ..Camera::default()
        };
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 12.0));
        assert!((distance_to_camera(world, &camera) - 36.0).abs() < 1e-5);
    }

    #[test]
    fn test_prepare_uploads_each_mesh_once() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut scene = SceneGraph::new();
        let geometry = Arc::new(sphere_geometry(1.0, 8, 4));
        scene.add(Node::mesh(
            "sun",
            Mesh::new(
                geometry.clone(),
                ShaderMaterial::opaque(ShaderProgram::Photosphere, LayerUniforms::default()),
            ),
        ));
        scene.add(
            Node::mesh(
                "halo",
                Mesh::new(
                    geometry,
                    ShaderMaterial::additive(
                        ShaderProgram::HeatHalo,
                        LayerUniforms::default(),
                        Side::Back,
                    ),
                ),
            )
            .with_transform(Transform::from_position(Vec3::X)),
        );

        let mut renderer = SceneRenderer::new(
            &device,
            wgpu::TextureFormat::Rgba8Unorm,
            64,
            64,
            ShaderLibrary::new(),
        );
        let camera = Camera::orbiting(Vec3::ZERO, 10.0, 0.0, 0.8);
        renderer.prepare(&device, &queue, &scene, &camera);
        renderer.prepare(&device, &queue, &scene, &camera);

        assert_eq!(renderer.draw_count(), 2);
        assert_eq!(renderer.uploaded_count(), 2);
    }

    #[test]
    fn test_render_offscreen_frame() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut scene = SceneGraph::new();
        scene.add(Node::mesh(
            "sun",
            Mesh::new(
                sphere_geometry(1.0, 16, 8),
                ShaderMaterial::opaque(ShaderProgram::Photosphere, LayerUniforms::default()),
            ),
        ));

        let format = wgpu::TextureFormat::Rgba8Unorm;
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen"),
            size: wgpu::Extent3d {
                width: 32,
                height: 32,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut renderer = SceneRenderer::new(&device, format, 32, 32, ShaderLibrary::new());
        let camera = Camera {
            aspect_ratio: 1.0,
            ..Camera::orbiting(Vec3::ZERO, 5.0, 0.0, 0.8)
        };
        renderer.prepare(&device, &queue, &scene, &camera);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen-encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("offscreen-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: renderer.depth_view(),
                    depth_ops: Some(DepthBuffer::clear_ops()),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            renderer.render(&mut pass);
        }
        queue.submit([encoder.finish()]);
        let _ = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        });
        assert_eq!(renderer.draw_count(), 1);
    }
}
