//! Local transforms for scene nodes.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Position, rotation and scale of a node relative to its parent.
///
/// Rotation is kept as XYZ Euler angles in radians so that a constant spin
/// about one axis is a plain add on that component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// The rotation as a quaternion.
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Replace the rotation with `q`, stored back as Euler angles.
    pub fn set_quaternion(&mut self, q: Quat) {
        let (x, y, z) = q.normalize().to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    /// Local-to-parent matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }

    /// Orient the node so its local X, Y and Z axes map onto the given
    /// orthonormal basis vectors.
    pub fn set_rotation_from_basis(&mut self, x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) {
        let basis = Mat3::from_cols(x_axis, y_axis, z_axis);
        self.set_quaternion(Quat::from_mat3(&basis));
    }

    /// Rotate by `angle` radians about `axis`, expressed in local space.
    pub fn rotate_on_axis(&mut self, axis: Vec3, angle: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.set_quaternion(self.quaternion() * Quat::from_axis_angle(axis, angle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_matrix_applies_translation_last() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        transform.scale = Vec3::splat(2.0);
        let p = transform.matrix().transform_point3(Vec3::X);
        assert_vec_close(p, Vec3::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn test_quaternion_round_trip() {
        let mut transform = Transform::default();
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, -0.5).normalize(), 0.9);
        transform.set_quaternion(q);
        let back = transform.quaternion();
        assert!(back.dot(q).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn test_y_rotation_is_plain_euler_add() {
        let mut transform = Transform::default();
        transform.rotation.y += FRAC_PI_2;
        let x = transform.matrix().transform_vector3(Vec3::X);
        assert_vec_close(x, -Vec3::Z);
    }

    #[test]
    fn test_rotation_from_basis_maps_axes() {
        let z_axis = Vec3::new(1.0, 1.0, 0.0).normalize();
        let x_axis = z_axis.cross(Vec3::Y).normalize();
        let y_axis = z_axis.cross(x_axis).normalize();

        let mut transform = Transform::default();
        transform.set_rotation_from_basis(x_axis, y_axis, z_axis);
        let m = transform.matrix();
        assert_vec_close(m.transform_vector3(Vec3::X), x_axis);
        assert_vec_close(m.transform_vector3(Vec3::Y), y_axis);
        assert_vec_close(m.transform_vector3(Vec3::Z), z_axis);
    }

    #[test]
    fn test_rotate_on_local_axis_keeps_that_axis() {
        let z_axis = Vec3::new(0.0, 0.6, 0.8);
        let x_axis = z_axis.cross(Vec3::Y).normalize();
        let y_axis = z_axis.cross(x_axis).normalize();

        let mut transform = Transform::default();
        transform.set_rotation_from_basis(x_axis, y_axis, z_axis);
        transform.rotate_on_axis(Vec3::Z, 1.3);

        let m = transform.matrix();
        assert_vec_close(m.transform_vector3(Vec3::Z), z_axis);
        let spun_x = m.transform_vector3(Vec3::X);
        assert!((spun_x.dot(x_axis) - 1.3f32.cos()).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_on_zero_axis_is_ignored() {
        let mut transform = Transform::default();
        transform.rotation = Vec3::new(0.1, 0.2, 0.3);
        transform.rotate_on_axis(Vec3::ZERO, 1.0);
        assert_eq!(transform.rotation, Vec3::new(0.1, 0.2, 0.3));
    }
}
