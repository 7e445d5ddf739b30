//! Unit quaternions for object orientation.
//!
//! Layout and multiplication order follow the usual `[x, y, z, w]` convention:
//! `a * b` applies `b` first, then `a`.

use super::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle_rad: f64) -> Self {
        let Some(axis) = axis.try_normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Euler angles applied in intrinsic X, then Y, then Z order.
    ///
    /// Equivalent to `qx * qy * qz`.
    pub fn from_euler_xyz(x_rad: f64, y_rad: f64, z_rad: f64) -> Self {
        let (s1, c1) = (x_rad * 0.5).sin_cos();
        let (s2, c2) = (y_rad * 0.5).sin_cos();
        let (s3, c3) = (z_rad * 0.5).sin_cos();

        Self::new(
            s1 * c2 * c3 + c1 * s2 * s3,
            c1 * s2 * c3 - s1 * c2 * s3,
            c1 * c2 * s3 + s1 * s2 * c3,
            c1 * c2 * c3 - s1 * s2 * s3,
        )
    }

    /// Build a rotation from the images of the local X, Y and Z axes.
    ///
    /// The axes must form a right-handed orthonormal basis.
    pub fn from_rotation_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let (m11, m12, m13) = (x_axis.x, y_axis.x, z_axis.x);
        let (m21, m22, m23) = (x_axis.y, y_axis.y, z_axis.y);
        let (m31, m32, m33) = (x_axis.z, y_axis.z, z_axis.z);
        let trace = m11 + m22 + m33;

        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new((m32 - m23) * s, (m13 - m31) * s, (m21 - m12) * s, 0.25 / s)
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            Self::new(0.25 * s, (m12 + m21) / s, (m13 + m31) / s, (m32 - m23) / s)
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            Self::new((m12 + m21) / s, 0.25 * s, (m23 + m32) / s, (m13 - m31) / s)
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            Self::new((m13 + m31) / s, (m23 + m32) / s, 0.25 * s, (m21 - m12) / s)
        };
        q.normalize()
    }

    pub fn normalize(self) -> Self {
        let n = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if n > 1e-10 && n.is_finite() {
            Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse for unit quaternions.
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v) * 2.0;
        v + t * self.w + qv.cross(t)
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, b: Self) -> Self::Output {
        let a = self;
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Quat;
    use crate::math::Vec3;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        let d = (a - b).length();
        assert!(d < 1e-9, "expected {a:?} ~= {b:?} (diff {d})");
    }

    #[test]
    fn identity_leaves_vectors_alone() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_vec_close(Quat::IDENTITY.rotate(v), v);
    }

    #[test]
    fn yaw_quarter_turn_maps_z_to_x() {
        let q = Quat::from_euler_xyz(0.0, FRAC_PI_2, 0.0);
        assert_vec_close(q.rotate(Vec3::Z), Vec3::X);
        assert_vec_close(q.rotate(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn euler_xyz_composes_x_then_y_then_z() {
        let (x, y, z) = (0.3, -0.7, 1.1);
        let composed = Quat::from_axis_angle(Vec3::X, x)
            * Quat::from_axis_angle(Vec3::Y, y)
            * Quat::from_axis_angle(Vec3::Z, z);
        let euler = Quat::from_euler_xyz(x, y, z);
        let v = Vec3::new(0.2, -1.0, 0.4);
        assert_vec_close(euler.rotate(v), composed.rotate(v));
    }

    #[test]
    fn rotation_axes_round_trip() {
        let q = Quat::from_euler_xyz(0.4, 1.2, -0.3);
        let rebuilt = Quat::from_rotation_axes(q.rotate(Vec3::X), q.rotate(Vec3::Y), q.rotate(Vec3::Z));
        let v = Vec3::new(1.0, -2.0, 0.5);
        assert_vec_close(rebuilt.rotate(v), q.rotate(v));
    }

    #[test]
    fn rotation_axes_handles_half_turns() {
        // Trace is -1: exercises the non-trace branches.
        let q = Quat::from_rotation_axes(-Vec3::X, Vec3::Y, -Vec3::Z);
        assert_vec_close(q.rotate(Vec3::Z), -Vec3::Z);
        assert_vec_close(q.rotate(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn conjugate_undoes_rotation() {
        let q = Quat::from_euler_xyz(0.9, 0.1, -0.4);
        let v = Vec3::new(3.0, 1.0, -2.0);
        assert_vec_close(q.conjugate().rotate(q.rotate(v)), v);
    }
}
