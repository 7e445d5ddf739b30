use foundation::math::{Mat4, Vec2, Vec3};
use scene::picking::Ray;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_y_deg: 70.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 15.0),
            target: Vec3::ZERO,
        }
    }
}

impl PerspectiveCamera {
    /// Camera on +Z at `distance`, looking at the origin.
    pub fn new(fov_y_deg: f64, width: f64, height: f64, near: f64, far: f64, distance: f64) -> Self {
        let mut camera = Self {
            fov_y_deg,
            near,
            far,
            position: Vec3::new(0.0, 0.0, distance),
            ..Self::default()
        };
        camera.resize(width, height);
        camera
    }

    /// Updates the aspect for a new canvas size. Degenerate sizes keep the
    /// previous aspect.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.target - self.position).try_normalize()?;
        let right = forward.cross(Vec3::Y).try_normalize()?;
        let up = right.cross(forward);
        Some((right, up, forward))
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        if !ndc.is_finite() {
            return None;
        }
        let (right, up, forward) = self.basis()?;
        let half_h = (0.5 * self.fov_y_deg.to_radians()).tan();
        let half_w = half_h * self.aspect;
        let dir = (forward + right * (ndc.x * half_w) + up * (ndc.y * half_h)).try_normalize()?;
        Some(Ray::new(self.position, dir))
    }

    pub fn view(&self) -> Mat4 {
        mat4_look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// Column-major view-projection for WGSL, depth range [0, 1].
    pub fn view_proj(&self) -> [[f32; 4]; 4] {
        (self.projection() * self.view()).to_f32_cols()
    }
}

fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let aspect = aspect.max(1e-6);
    let m22 = far / (near - far);
    let m23 = (near * far) / (near - far);

    // Column-major form of:
    // [ f/a  0   0    0  ]
    // [  0   f   0    0  ]
    // [  0   0  m22  m23 ]
    // [  0   0  -1    0  ]
    Mat4 {
        cols: [
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, m22, -1.0],
            [0.0, 0.0, m23, 0.0],
        ],
    }
}

fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).try_normalize().unwrap_or(-Vec3::Z);
    let s = f.cross(up).try_normalize().unwrap_or(Vec3::X);
    let u = s.cross(f);

    Mat4 {
        cols: [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use foundation::math::{Vec2, Vec3};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn clip(m: [[f32; 4]; 4], p: Vec3) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = f64::from(m[0][row]) * p.x
                + f64::from(m[1][row]) * p.y
                + f64::from(m[2][row]) * p.z
                + f64::from(m[3][row]);
        }
        out
    }

    #[test]
    fn center_ray_points_at_the_origin() {
        let camera = PerspectiveCamera::new(70.0, 800.0, 600.0, 0.1, 1000.0, 15.0);
        let ray = camera.ray_from_ndc(Vec2::new(0.0, 0.0)).expect("ray");
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 15.0));
        assert_close(ray.dir.x, 0.0);
        assert_close(ray.dir.y, 0.0);
        assert_close(ray.dir.z, -1.0);
    }

    #[test]
    fn corner_ray_spans_the_frustum() {
        let camera = PerspectiveCamera::new(90.0, 200.0, 100.0, 0.1, 1000.0, 10.0);
        let ray = camera.ray_from_ndc(Vec2::new(1.0, 1.0)).expect("ray");
        // tan(45°) = 1, aspect 2: direction (2, 1, -1) normalized.
        let expected = Vec3::new(2.0, 1.0, -1.0) * (1.0 / 6f64.sqrt());
        assert!((ray.dir - expected).length() < 1e-9);
    }

    #[test]
    fn nan_ndc_has_no_ray() {
        let camera = PerspectiveCamera::default();
        assert!(camera.ray_from_ndc(Vec2::new(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn view_proj_maps_near_and_far_to_unit_depth() {
        let camera = PerspectiveCamera::new(70.0, 800.0, 600.0, 0.1, 1000.0, 15.0);
        let m = camera.view_proj();

        let near = clip(m, Vec3::new(0.0, 0.0, 15.0 - 0.1));
        assert!((near[2] / near[3]).abs() < 1e-4);
        let far = clip(m, Vec3::new(0.0, 0.0, 15.0 - 1000.0));
        assert!((far[2] / far[3] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn projected_ray_points_land_on_their_ndc() {
        let camera = PerspectiveCamera::new(70.0, 1280.0, 720.0, 0.1, 1000.0, 15.0);
        let ndc = Vec2::new(0.25, -0.5);
        let ray = camera.ray_from_ndc(ndc).expect("ray");
        let c = clip(camera.view_proj(), ray.at(7.0));
        assert!((c[0] / c[3] - 0.25).abs() < 1e-5);
        assert!((c[1] / c[3] + 0.5).abs() < 1e-5);
    }

    #[test]
    fn resize_updates_aspect_only() {
        let mut camera = PerspectiveCamera::default();
        camera.resize(1920.0, 1080.0);
        assert_close(camera.aspect, 1920.0 / 1080.0);
        camera.resize(0.0, 1080.0);
        assert_close(camera.aspect, 1920.0 / 1080.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 15.0));
    }
}
