use crate::math::Vec3;

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb3 { min, max }
    }

    /// Box of the given full extents centered on `center`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Aabb3 {
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Slab test. Returns the ray parameter where the ray enters the box,
    /// clamped to `t_min` when the origin is already inside.
    ///
    /// `dir` does not need to be normalized; the returned parameter is in
    /// units of `dir`.
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3, mut t_min: f64, mut t_max: f64) -> Option<f64> {
        let o = origin.as_array();
        let d = dir.as_array();
        let lo = self.min.as_array();
        let hi = self.max.as_array();

        for axis in 0..3 {
            if d[axis].abs() < 1e-12 {
                if o[axis] < lo[axis] || o[axis] > hi[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[axis];
            let mut t1 = (lo[axis] - o[axis]) * inv;
            let mut t2 = (hi[axis] - o[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_max < t_min {
                return None;
            }
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb3;
    use crate::math::Vec3;

    fn unit_box() -> Aabb3 {
        Aabb3::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn contains_point_inside() {
        assert!(unit_box().contains(Vec3::new(0.5, 0.0, -0.5)));
        assert!(!unit_box().contains(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn ray_entry_hits_front_face() {
        let t = unit_box()
            .ray_entry(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0, f64::INFINITY)
            .expect("hit");
        assert_eq!(t, 4.0);
    }

    #[test]
    fn ray_entry_scales_with_unnormalized_direction() {
        let t = unit_box()
            .ray_entry(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0), 0.0, f64::INFINITY)
            .expect("hit");
        assert_eq!(t, 2.0);
    }

    #[test]
    fn ray_parallel_outside_slab_misses() {
        let hit = unit_box().ray_entry(
            Vec3::new(0.0, 3.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            0.0,
            f64::INFINITY,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn box_behind_ray_is_missed() {
        let hit = unit_box().ray_entry(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, 1.0),
            0.0,
            f64::INFINITY,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn from_center_size_is_symmetric() {
        let b = Aabb3::from_center_size(Vec3::new(0.0, 0.0, -0.5), Vec3::new(0.2, 0.2, 1.0));
        assert_eq!(b.min, Vec3::new(-0.1, -0.1, -1.0));
        assert_eq!(b.max, Vec3::new(0.1, 0.1, 0.0));
    }
}
