use foundation::bounds::Aabb3;
use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PointCloudId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    /// UV sphere centered on the local origin.
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    /// Box whose geometry is pre-translated so its center sits at `center`.
    Box { size: Vec3, center: Vec3 },
    Points { cloud: PointCloudId },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
}

impl Drawable3D {
    pub fn sphere(radius: f64, width_segments: u32, height_segments: u32) -> Self {
        Self {
            shape: Shape3D::Sphere {
                radius,
                width_segments,
                height_segments,
            },
        }
    }

    pub fn cuboid(size: Vec3, center: Vec3) -> Self {
        Self {
            shape: Shape3D::Box { size, center },
        }
    }

    pub fn points(cloud: PointCloudId) -> Self {
        Self {
            shape: Shape3D::Points { cloud },
        }
    }

    /// Local-space box for box geometry.
    pub fn box_bounds(&self) -> Option<Aabb3> {
        match self.shape {
            Shape3D::Box { size, center } => Some(Aabb3::from_center_size(center, size)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawable3D, Shape3D};
    use foundation::math::Vec3;

    #[test]
    fn create_sphere_drawable() {
        let drawable = Drawable3D::sphere(5.0, 50, 50);
        assert!(matches!(drawable.shape, Shape3D::Sphere { .. }));
        assert!(drawable.box_bounds().is_none());
    }

    #[test]
    fn box_bounds_follow_the_offset_center() {
        let drawable = Drawable3D::cuboid(Vec3::new(0.5, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let b = drawable.box_bounds().expect("box");
        assert_eq!(b.min.z, -2.0);
        assert_eq!(b.max.z, 0.0);
    }
}
