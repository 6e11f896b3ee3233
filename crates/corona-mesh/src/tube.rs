//! Tubes swept along a curve.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::curve::Curve;
use crate::geometry::Geometry;

/// Sweep a circle of `radius` along `curve`.
///
/// Produces `(tubular_segments + 1) * (radial_segments + 1)` vertices. UV `x`
/// runs from 0 at the start of the curve to 1 at its end; UV `y` runs once
/// around the cross-section. Segment counts are clamped to at least 1 along
/// the curve and 3 around it.
pub fn tube_geometry(
    curve: &impl Curve,
    tubular_segments: u32,
    radius: f32,
    radial_segments: u32,
    closed: bool,
) -> Geometry {
    let tubular_segments = tubular_segments.max(1);
    let radial_segments = radial_segments.max(3);
    let frames = curve.frenet_frames(tubular_segments, closed);

    let ring = radial_segments + 1;
    let vertex_count = ((tubular_segments + 1) * ring) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for i in 0..=tubular_segments {
        // Closed tubes reuse the first ring so the seam has no gap.
        let sample = if closed && i == tubular_segments { 0 } else { i };
        let u = sample as f32 / tubular_segments as f32;
        let center = curve.point_at(u);
        let n = frames.normals[sample as usize];
        let b = frames.binormals[sample as usize];

        for j in 0..=radial_segments {
            let angle = j as f32 / radial_segments as f32 * TAU;
            let normal = (n * -angle.cos() + b * angle.sin()).normalize_or(n);

            positions.push(center + normal * radius);
            normals.push(normal);
            uvs.push([
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            ]);
        }
    }

    let mut indices = Vec::with_capacity((tubular_segments * radial_segments * 6) as usize);
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = ring * (j - 1) + (i - 1);
            let b = ring * j + (i - 1);
            let c = ring * j + i;
            let d = ring * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry {
        positions,
        normals,
        uvs,
        indices,
    }
}

/// Project `point` onto the nearest of `samples`, returning that distance.
#[cfg(test)]
fn distance_to_polyline(point: Vec3, samples: &[Vec3]) -> f32 {
    samples
        .windows(2)
        .map(|seg| {
            let (a, b) = (seg[0], seg[1]);
            let ab = b - a;
            let t = ((point - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
            point.distance(a + ab * t)
        })
        .fold(f32::INFINITY, f32::min)
}
