//! Indexed triangle geometry shared by every sun layer.

use glam::Vec3;

/// An indexed triangle list with per-vertex normals and UVs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Vertex positions in object space.
    pub positions: Vec<Vec3>,
    /// Unit normals, one per position.
    pub normals: Vec<Vec3>,
    /// Texture coordinates, one per position.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices, counter-clockwise when seen from the front.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Distance from the origin to the farthest vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }

    /// Iterate triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Geometry {
        Geometry {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 2.0, 0.0)],
            normals: vec![Vec3::Z; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_counts() {
        let geometry = single_triangle();
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn test_bounding_radius_is_farthest_vertex() {
        assert_eq!(single_triangle().bounding_radius(), 2.0);
        assert_eq!(Geometry::default().bounding_radius(), 0.0);
    }

    #[test]
    fn test_triangles_resolve_indices() {
        let geometry = single_triangle();
        let tris: Vec<_> = geometry.triangles().collect();
        assert_eq!(tris, vec![[Vec3::ZERO, Vec3::X, Vec3::new(0.0, 2.0, 0.0)]]);
    }
}
