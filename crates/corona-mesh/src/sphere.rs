//! Latitude/longitude sphere generation.
//!
//! The photosphere, the corona shells and the heat halo are all UV spheres.
//! A UV sphere (rather than an icosphere) keeps the seam and pole layout that
//! the corona rim shaders were tuned against.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::geometry::Geometry;

/// Build a UV sphere of the given radius centered on the origin.
///
/// The grid has `(width_segments + 1) * (height_segments + 1)` vertices; the
/// seam column is duplicated so UVs stay continuous. The degenerate triangles
/// that would touch each pole twice are skipped. Segment counts are clamped
/// to at least 3 around and 2 from pole to pole.
pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let columns = width_segments + 1;
    let rows = height_segments + 1;

    let vertex_count = (columns * rows) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for iy in 0..rows {
        let v = iy as f32 / height_segments as f32;

        // Shift pole UVs half a cell so each pole triangle samples its own column.
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let theta = v * PI;
        for ix in 0..columns {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;

            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );

            positions.push(position);
            normals.push(position.normalize_or(Vec3::Y));
            uvs.push([u + u_offset, 1.0 - v]);
        }
    }

    let mut indices = Vec::with_capacity((width_segments * (height_segments - 1) * 6) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * columns + ix + 1;
            let b = iy * columns + ix;
            let c = (iy + 1) * columns + ix;
            let d = (iy + 1) * columns + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry {
        positions,
        normals,
        uvs,
        indices,
    }
}
