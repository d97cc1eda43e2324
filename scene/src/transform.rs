use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// A translation and rotation that can be converted into a 4x4 matrix.
///
/// Rotation is stored as a quaternion; the keyable rotate channels use euler
/// XYZ degrees, so conversions for both directions are provided.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a new transform from a translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create a new transform from euler XYZ angles in degrees.
    pub fn from_euler_deg(translation: Vec3, rotate_deg: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                rotate_deg.x.to_radians(),
                rotate_deg.y.to_radians(),
                rotate_deg.z.to_radians(),
            ),
        }
    }

    /// Build a transform from local x/y axes.
    ///
    /// The basis is orthonormalized with x as the primary axis: z = x ^ y,
    /// y = z ^ x. The axes do not need to be unit length.
    pub fn from_axes(translation: Vec3, x_axis: Vec3, y_axis: Vec3) -> Self {
        let x = x_axis.normalize();
        let z = x.cross(y_axis).normalize();
        let y = z.cross(x);
        Self {
            translation,
            rotation: Quat::from_mat3(&Mat3::from_cols(x, y, z)),
        }
    }

    pub fn x_axis(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn y_axis(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn z_axis(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Rotate about the local x axis (object space, post-multiply).
    pub fn rotate_local_x(&mut self, degrees: f32) {
        self.rotation = self.rotation * Quat::from_rotation_x(degrees.to_radians());
    }

    /// The rotation as euler XYZ angles in degrees.
    pub fn rotate_deg(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn approx_v3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn from_axes_orthonormalizes() {
        let t = Transform::from_axes(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.1, 3.0, 0.0));
        assert!(approx_v3(t.x_axis(), Vec3::X));
        assert!(approx_v3(t.y_axis(), Vec3::Y));
        assert!(approx_v3(t.z_axis(), Vec3::Z));
    }

    #[test]
    fn euler_round_trip() {
        let t = Transform::from_euler_deg(Vec3::new(1.0, 2.0, 3.0), Vec3::new(30.0, -45.0, 10.0));
        assert!(approx_v3(t.rotate_deg(), Vec3::new(30.0, -45.0, 10.0)));
    }

    #[test]
    fn local_x_flip_twice_is_identity() {
        let mut t = Transform::from_euler_deg(Vec3::ZERO, Vec3::new(10.0, 20.0, 30.0));
        let orig = t.rotation;
        t.rotate_local_x(180.0);
        t.rotate_local_x(180.0);
        assert!(orig.dot(t.rotation).abs() > 1.0 - 1e-4);
    }

    #[test]
    fn flip_preserves_local_x() {
        let mut t = Transform::from_axes(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0));
        let x = t.x_axis();
        t.rotate_local_x(180.0);
        assert!(approx_v3(t.x_axis(), x));
        assert!(approx_v3(t.y_axis(), -Transform::from_axes(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0)).y_axis()));
    }
}
