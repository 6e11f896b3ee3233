//! Shader materials attached to mesh nodes.

/// The WGSL program a material is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderProgram {
    /// Noise-driven sun surface.
    Photosphere,
    /// Flickering translucent shell.
    Corona,
    /// Wobbling plasma arc.
    CoronalLoop,
    /// Soft noise glow around the sun.
    HeatHalo,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 4] = [
        ShaderProgram::Photosphere,
        ShaderProgram::Corona,
        ShaderProgram::CoronalLoop,
        ShaderProgram::HeatHalo,
    ];

    /// Stable name, also the shader library key.
    pub fn name(self) -> &'static str {
        match self {
            ShaderProgram::Photosphere => "photosphere",
            ShaderProgram::Corona => "corona",
            ShaderProgram::CoronalLoop => "coronal_loop",
            ShaderProgram::HeatHalo => "heat_halo",
        }
    }
}

/// How fragments combine with what is already in the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Blending {
    #[default]
    Normal,
    /// `src * src_alpha + dst`.
    Additive,
}

/// Which triangle faces are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Per-material shader parameters.
///
/// Every program reads `time` and `exposure`. The corona program also reads
/// the colors and `intensity`, the loop program reads `seed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerUniforms {
    pub time: f32,
    pub exposure: f32,
    pub intensity: f32,
    pub seed: f32,
    pub color_inner: [f32; 3],
    pub color_outer: [f32; 3],
}

impl Default for LayerUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            exposure: 1.0,
            intensity: 1.0,
            seed: 0.0,
            color_inner: [1.0; 3],
            color_outer: [1.0; 3],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShaderMaterial {
    pub program: ShaderProgram,
    pub uniforms: LayerUniforms,
    pub transparent: bool,
    pub blending: Blending,
    pub side: Side,
    pub depth_write: bool,
}

impl ShaderMaterial {
    /// Opaque, front-facing, depth-writing material.
    pub fn opaque(program: ShaderProgram, uniforms: LayerUniforms) -> Self {
        Self {
            program,
            uniforms,
            transparent: false,
            blending: Blending::Normal,
            side: Side::Front,
            depth_write: true,
        }
    }

    /// Transparent additive material that does not write depth.
    pub fn additive(program: ShaderProgram, uniforms: LayerUniforms, side: Side) -> Self {
        Self {
            program,
            uniforms,
            transparent: true,
            blending: Blending::Additive,
            side,
            depth_write: false,
        }
    }
}
