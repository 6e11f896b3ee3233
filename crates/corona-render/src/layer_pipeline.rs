//! Render pipelines for the layer programs.
//!
//! Every program shares one pipeline layout: the camera block at group 0 and
//! a per-mesh [`LayerUniform`] at group 1. Pipelines differ only in shader and
//! fixed-function state, so they are keyed by [`PipelineKey`] and built the
//! first time a material needs one.

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use corona_scene::{Blending, LayerUniforms, ShaderMaterial, ShaderProgram, Side};
use glam::Mat4;

use crate::buffer::LayerVertex;
use crate::camera::CameraUniform;
use crate::depth::DepthBuffer;
use crate::shader::ShaderLibrary;

/// Per-mesh uniform block, matching `struct Layer` in the WGSL programs.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LayerUniform {
    pub model: [[f32; 4]; 4],
    pub color_inner: [f32; 3],
    pub time: f32,
    pub color_outer: [f32; 3],
    pub exposure: f32,
    pub intensity: f32,
    pub seed: f32,
    pub _pad: [f32; 2],
}

impl LayerUniform {
    pub fn new(model: Mat4, uniforms: &LayerUniforms) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color_inner: uniforms.color_inner,
            time: uniforms.time,
            color_outer: uniforms.color_outer,
            exposure: uniforms.exposure,
            intensity: uniforms.intensity,
            seed: uniforms.seed,
            _pad: [0.0; 2],
        }
    }
}

/// Everything about a material that changes pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: ShaderProgram,
    pub blending: Blending,
    pub side: Side,
    pub transparent: bool,
    pub depth_write: bool,
}

impl PipelineKey {
    pub fn from_material(material: &ShaderMaterial) -> Self {
        Self {
            program: material.program,
            blending: material.blending,
            side: material.side,
            transparent: material.transparent,
            depth_write: material.depth_write,
        }
    }

    /// Back-side materials show the inside of the mesh, so front faces are
    /// culled.
    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        match self.side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }

    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        match (self.blending, self.transparent) {
            (Blending::Additive, _) => {
                let additive = wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                };
                Some(wgpu::BlendState {
                    color: additive,
                    alpha: additive,
                })
            }
            (Blending::Normal, true) => Some(wgpu::BlendState::ALPHA_BLENDING),
            (Blending::Normal, false) => None,
        }
    }

    fn label(&self) -> String {
        format!(
            "{}-{:?}-{:?}{}",
            self.program.name(),
            self.blending,
            self.side,
            if self.depth_write { "" } else { "-nodepthwrite" }
        )
    }
}

/// Lazily built pipelines for every material seen so far.
pub struct LayerPipelines {
    camera_layout: wgpu::BindGroupLayout,
    layer_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    shaders: ShaderLibrary,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl LayerPipelines {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shaders: ShaderLibrary,
    ) -> Self {
        let camera_layout = uniform_layout(
            device,
            "camera-bind-group-layout",
            std::mem::size_of::<CameraUniform>(),
        );
        let layer_layout = uniform_layout(
            device,
            "layer-bind-group-layout",
            std::mem::size_of::<LayerUniform>(),
        );
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("layer-pipeline-layout"),
            bind_group_layouts: &[&camera_layout, &layer_layout],
            immediate_size: 0,
        });

        Self {
            camera_layout,
            layer_layout,
            pipeline_layout,
            surface_format,
            shaders,
            pipelines: HashMap::new(),
        }
    }

    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_layout
    }

    pub fn layer_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layer_layout
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Build the pipeline for `key` if it does not exist yet.
    pub fn prepare(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let module = match self.shaders.get(key.program.name()) {
            Some(module) => module,
            None => self.shaders.load_program(device, key.program),
        };
        let pipeline = self.create_pipeline(device, &module, key);
        log::debug!("Created pipeline {}", key.label());
        self.pipelines.insert(key, pipeline);
    }

    /// Recompile programs whose override file changed and drop the pipelines
    /// built from their old modules. They are rebuilt on the next
    /// [`prepare`](Self::prepare). Returns the recompiled programs.
    pub fn reload_shaders(&mut self, device: &wgpu::Device) -> Vec<ShaderProgram> {
        let stale = self.shaders.stale_programs();
        for &program in &stale {
            self.shaders.load_program(device, program);
        }
        self.pipelines.retain(|key, _| !stale.contains(&key.program));
        stale
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        let label = key.label();
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[LayerVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.cull_mode(),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: key.depth_write,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: key.blend_state(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        })
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, size: usize) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}
