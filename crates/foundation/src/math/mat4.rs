use super::{Quat, Vec3};

/// Column-major affine transform (`cols[column][row]`), matching WGSL layout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    /// Translation * Rotation * Scale.
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let Quat { x, y, z, w } = rotation;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);

        Self {
            cols: [
                [
                    (1.0 - (yy + zz)) * scale.x,
                    (xy + wz) * scale.x,
                    (xz - wy) * scale.x,
                    0.0,
                ],
                [
                    (xy - wz) * scale.y,
                    (1.0 - (xx + zz)) * scale.y,
                    (yz + wx) * scale.y,
                    0.0,
                ],
                [
                    (xz + wy) * scale.z,
                    (yz - wx) * scale.z,
                    (1.0 - (xx + yy)) * scale.z,
                    0.0,
                ],
                [translation.x, translation.y, translation.z, 1.0],
            ],
        }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1],
            c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2],
        )
    }

    /// Applies the linear part only (no translation).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * v.x + c[1][0] * v.y + c[2][0] * v.z,
            c[0][1] * v.x + c[1][1] * v.y + c[2][1] * v.z,
            c[0][2] * v.x + c[1][2] * v.y + c[2][2] * v.z,
        )
    }

    /// Inverse of an affine matrix. Returns `None` when the linear part is singular.
    pub fn inverse_affine(&self) -> Option<Self> {
        let c = &self.cols;
        let (a, b, cc) = (c[0][0], c[1][0], c[2][0]);
        let (d, e, f) = (c[0][1], c[1][1], c[2][1]);
        let (g, h, i) = (c[0][2], c[1][2], c[2][2]);

        let co_a = e * i - f * h;
        let co_b = -(d * i - f * g);
        let co_c = d * h - e * g;
        let det = a * co_a + b * co_b + cc * co_c;
        if !det.is_finite() || det.abs() < 1e-18 {
            return None;
        }
        let inv_det = 1.0 / det;

        // Row-major inverse of the 3x3 block.
        let r = [
            [co_a * inv_det, -(b * i - cc * h) * inv_det, (b * f - cc * e) * inv_det],
            [co_b * inv_det, (a * i - cc * g) * inv_det, -(a * f - cc * d) * inv_det],
            [co_c * inv_det, -(a * h - b * g) * inv_det, (a * e - b * d) * inv_det],
        ];

        let t = Vec3::new(c[3][0], c[3][1], c[3][2]);
        let tx = -(r[0][0] * t.x + r[0][1] * t.y + r[0][2] * t.z);
        let ty = -(r[1][0] * t.x + r[1][1] * t.y + r[1][2] * t.z);
        let tz = -(r[2][0] * t.x + r[2][1] * t.y + r[2][2] * t.z);

        Some(Self {
            cols: [
                [r[0][0], r[1][0], r[2][0], 0.0],
                [r[0][1], r[1][1], r[2][1], 0.0],
                [r[0][2], r[1][2], r[2][2], 0.0],
                [tx, ty, tz, 1.0],
            ],
        })
    }

    pub fn to_f32_cols(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (col, src) in out.iter_mut().zip(self.cols.iter()) {
            for (dst, v) in col.iter_mut().zip(src.iter()) {
                *dst = *v as f32;
            }
        }
        out
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Self;

    fn mul(self, b: Self) -> Self::Output {
        let a = &self.cols;
        let mut c = [[0.0f64; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                c[col][row] = a[0][row] * b.cols[col][0]
                    + a[1][row] * b.cols[col][1]
                    + a[2][row] * b.cols[col][2]
                    + a[3][row] * b.cols[col][3];
            }
        }
        Self { cols: c }
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::{Quat, Vec3};

    fn assert_vec_close(a: Vec3, b: Vec3) {
        let d = (a - b).length();
        assert!(d < 1e-9, "expected {a:?} ~= {b:?} (diff {d})");
    }

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let m = Mat4::from_trs(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_euler_xyz(0.0, std::f64::consts::FRAC_PI_2, 0.0),
            Vec3::new(1.0, 1.0, 2.0),
        );
        // (0,0,1) -> scale (0,0,2) -> yaw (2,0,0) -> translate (12,0,0)
        assert_vec_close(m.transform_point(Vec3::Z), Vec3::new(12.0, 0.0, 0.0));
        assert_vec_close(m.transform_vector(Vec3::Z), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn mul_composes_right_to_left() {
        let t = Mat4::translation(Vec3::new(0.0, 0.0, -1.0));
        let s = Mat4::scale(Vec3::new(1.0, 1.0, 3.0));
        // Translate first, then scale: (0,0,0) -> (0,0,-1) -> (0,0,-3)
        assert_vec_close((s * t).transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn inverse_affine_round_trips() {
        let m = Mat4::from_trs(
            Vec3::new(1.0, -2.0, 5.0),
            Quat::from_euler_xyz(0.3, -1.1, 0.7),
            Vec3::new(1.0, 1.0, 1.4),
        );
        let inv = m.inverse_affine().expect("invertible");
        let p = Vec3::new(0.25, 4.0, -3.0);
        assert_vec_close(inv.transform_point(m.transform_point(p)), p);
        assert_vec_close(m.transform_point(inv.transform_point(p)), p);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Mat4::scale(Vec3::new(1.0, 0.0, 1.0)).inverse_affine().is_none());
    }
}
