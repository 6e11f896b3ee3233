//! Coronal loop shapes and their placement on the sun's surface.

use std::f32::consts::{PI, TAU};

use corona_config::LoopConfig;
use corona_mesh::{CatmullRomCurve3, Geometry, tube_geometry};
use corona_scene::Transform;
use glam::Vec3;
use rand::Rng;

/// Control points of an arch in the local XY plane, from `(width, 0, 0)` over
/// `(0, height, 0)` down to `(-width, 0, 0)`.
pub fn loop_path(width: f32, height: f32, segments: u32) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|j| {
            let angle = j as f32 / segments as f32 * PI;
            Vec3::new(angle.cos() * width, angle.sin() * height, 0.0)
        })
        .collect()
}

/// Orthonormal `(tangent, binormal, normal)` frame for a point on a sphere
/// with unit outward `normal`.
///
/// The tangent is `normal × Y`, or `normal × X` near the poles where that
/// vanishes.
pub fn surface_frame(normal: Vec3) -> (Vec3, Vec3, Vec3) {
    let mut tangent = normal.cross(Vec3::Y);
    if tangent.length() < 0.001 {
        tangent = normal.cross(Vec3::X);
    }
    let tangent = tangent.normalize();
    let binormal = normal.cross(tangent).normalize();
    (tangent, binormal, normal)
}

/// The random parameters of one loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopShape {
    pub height: f32,
    pub width: f32,
    /// Phase offset for the wobble in the loop shader.
    pub seed: f32,
    /// Unit outward normal at the anchor point.
    pub normal: Vec3,
    /// Spin about the surface normal, in radians.
    pub spin: f32,
}

impl LoopShape {
    /// Draw a loop shape. The anchor is uniformly distributed over the sphere.
    pub fn sample(rng: &mut impl Rng, config: &LoopConfig) -> Self {
        let height = config.height_min + rng.random::<f32>() * config.height_span;
        let width = config.width_min + rng.random::<f32>() * config.width_span;
        let seed = rng.random::<f32>() * config.seed_range;

        let theta = rng.random::<f32>() * TAU;
        let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
        let normal = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());

        let spin = rng.random::<f32>() * TAU;

        Self {
            height,
            width,
            seed,
            normal,
            spin,
        }
    }

    /// Tube mesh following the arch.
    pub fn geometry(&self, config: &LoopConfig) -> Geometry {
        let curve = CatmullRomCurve3::new(loop_path(self.width, self.height, config.segments));
        tube_geometry(
            &curve,
            config.segments,
            config.tube_radius,
            config.radial_segments,
            false,
        )
    }

    /// Place the loop on a sphere of `radius`, oriented by [`surface_frame`]
    /// and then spun by `spin` about the surface normal.
    ///
    /// The spin axis is the normal's components taken in the loop's local
    /// space, so it is generally not the frame's Z axis and the arch tilts
    /// out of the tangent plane.
    pub fn transform(&self, radius: f32) -> Transform {
        let mut transform = Transform::from_position(self.normal * radius);
        let (tangent, binormal, normal) = surface_frame(self.normal);
        transform.set_rotation_from_basis(tangent, binormal, normal);
        transform.rotate_on_axis(self.normal, self.spin);
        transform
    }
}
